use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ServiceArea {
    zips: HashSet<String>,
}

pub fn normalize_zip(raw: &str) -> Option<String> {
    let zip: String = raw.trim().chars().take(5).collect();
    (zip.len() == 5 && zip.chars().all(|c| c.is_ascii_digit())).then_some(zip)
}

impl ServiceArea {
    /// Entries that are not valid ZIPs are skipped.
    pub fn new<I, S>(zips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let zips = zips
            .into_iter()
            .filter_map(|z| {
                let normalized = normalize_zip(z.as_ref());
                if normalized.is_none() {
                    tracing::warn!(zip = z.as_ref(), "ignoring malformed service area ZIP");
                }
                normalized
            })
            .collect();
        Self { zips }
    }

    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(',').map(str::trim).filter(|z| !z.is_empty()))
    }

    pub fn contains(&self, zip: &str) -> bool {
        normalize_zip(zip).is_some_and(|z| self.zips.contains(&z))
    }

    pub fn len(&self) -> usize {
        self.zips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> ServiceArea {
        ServiceArea::from_csv("02169, 02170,02171")
    }

    #[test]
    fn test_zip_plus_four_matches_base_zip() {
        let area = area();
        assert_eq!(area.contains("02169-1234"), area.contains("02169"));
        assert!(area.contains(" 02170 "));
    }

    #[test]
    fn test_outside_area() {
        assert!(!area().contains("90210"));
    }

    #[test]
    fn test_malformed_zip_never_matches() {
        let area = area();
        assert!(!area.contains("0216"));
        assert!(!area.contains("ABCDE"));
        assert!(!area.contains(""));
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let area = ServiceArea::from_csv("02169,nope,,123");
        assert_eq!(area.len(), 1);
    }
}
