use crate::error::VerificationError;
use core_types::Series;

/// Slice of the reference result page `page` of size `page_size` should hold.
pub fn expected_page(reference: &[Series], page_size: u32, page: u32) -> &[Series] {
    let start = (page_size as usize * page as usize).min(reference.len());
    let end = (start + page_size as usize).min(reference.len());
    &reference[start..end]
}

/// Number of pages of `page_size` needed to walk the reference result.
pub fn page_count(reference_len: usize, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    reference_len.div_ceil(page_size as usize) as u32
}

/// The page the service returned must match the reference slice exactly,
/// compared as JSON values.
pub fn verify_page(
    reference: &[Series],
    actual: &[Series],
    page_size: u32,
    page: u32,
) -> Result<(), VerificationError> {
    let expected = expected_page(reference, page_size, page);
    let same = serde_json::to_value(expected).ok() == serde_json::to_value(actual).ok()
        && expected.len() == actual.len();
    if same {
        Ok(())
    } else {
        Err(VerificationError::PageMismatch { page_size, page })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Frequency;

    fn rows(n: usize) -> Vec<Series> {
        (0..n).map(|i| Series::new(format!("s{i}"), Frequency::Annual, vec![])).collect()
    }

    #[test]
    fn slices_and_counts_pages() {
        let reference = rows(12);
        assert_eq!(page_count(reference.len(), 5), 3);
        assert_eq!(page_count(reference.len(), 75), 1);
        assert_eq!(expected_page(&reference, 5, 2).len(), 2);
        assert!(expected_page(&reference, 5, 9).is_empty());
    }

    #[test]
    fn detects_a_shifted_page() {
        let reference = rows(10);
        assert!(verify_page(&reference, &reference[5..10], 5, 1).is_ok());
        assert_eq!(
            verify_page(&reference, &reference[4..9], 5, 1),
            Err(VerificationError::PageMismatch { page_size: 5, page: 1 })
        );
    }
}
