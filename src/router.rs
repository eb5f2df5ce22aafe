#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Apps,
    Dictionary,
    Calculator,
    Files,
}

/// Where a piece of input text should go, with the prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route<'a> {
    pub backend: BackendKind,
    pub text: &'a str,
}

/// Picks a backend from the start of the input. The longest matching prefix
/// wins, equal lengths go to whichever was configured first.
#[derive(Debug, Clone, Default)]
pub struct Router {
    prefixes: Vec<(String, BackendKind)>,
}

impl Router {
    pub fn new(prefixes: Vec<(String, BackendKind)>) -> Self {
        let prefixes = prefixes
            .into_iter()
            .filter(|(prefix, _)| {
                if prefix.is_empty() {
                    log::warn!("Ignoring empty search prefix");
                }
                !prefix.is_empty()
            })
            .collect();
        Self { prefixes }
    }

    pub fn route<'a>(&self, input: &'a str) -> Route<'a> {
        let mut best: Option<&(String, BackendKind)> = None;
        for candidate in &self.prefixes {
            if input.starts_with(candidate.0.as_str())
                && best.is_none_or(|(prefix, _)| candidate.0.len() > prefix.len())
            {
                best = Some(candidate);
            }
        }

        match best {
            Some((prefix, backend)) => Route {
                backend: *backend,
                text: input[prefix.len()..].trim(),
            },
            None => Route {
                backend: BackendKind::Apps,
                text: input,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(prefixes: &[(&str, BackendKind)]) -> Router {
        Router::new(prefixes.iter().map(|(p, b)| (p.to_string(), *b)).collect())
    }

    #[test]
    fn prefix_is_stripped_with_whitespace() {
        let r = router(&[("!d", BackendKind::Dictionary), ("/", BackendKind::Calculator)]);
        assert_eq!(r.route("!d dog"), Route { backend: BackendKind::Dictionary, text: "dog" });
        assert_eq!(r.route("/ 1 + 2 "), Route { backend: BackendKind::Calculator, text: "1 + 2" });
    }

    #[test]
    fn unmatched_text_goes_to_apps_untouched() {
        let r = router(&[("!d", BackendKind::Dictionary), ("/", BackendKind::Calculator)]);
        assert_eq!(r.route("plain text"), Route { backend: BackendKind::Apps, text: "plain text" });
        assert_eq!(r.route(" /x"), Route { backend: BackendKind::Apps, text: " /x" });
        assert_eq!(r.route(""), Route { backend: BackendKind::Apps, text: "" });
    }

    #[test]
    fn matching_is_case_sensitive() {
        let r = router(&[("!d", BackendKind::Dictionary)]);
        assert_eq!(r.route("!D dog").backend, BackendKind::Apps);
    }

    #[test]
    fn longest_prefix_wins_then_list_order() {
        let r = router(&[
            ("!", BackendKind::Calculator),
            ("!d", BackendKind::Dictionary),
            ("=", BackendKind::Calculator),
            ("=", BackendKind::Dictionary),
        ]);
        assert_eq!(r.route("!dog").backend, BackendKind::Dictionary);
        assert_eq!(r.route("!2*3"), Route { backend: BackendKind::Calculator, text: "2*3" });
        assert_eq!(r.route("=1").backend, BackendKind::Calculator);
    }

    #[test]
    fn file_prefix_routes_to_files() {
        let r = router(&[("!d", BackendKind::Dictionary), ("~", BackendKind::Files)]);
        assert_eq!(r.route("~ report"), Route { backend: BackendKind::Files, text: "report" });
    }

    #[test]
    fn empty_prefixes_are_ignored() {
        let r = router(&[("", BackendKind::Dictionary)]);
        assert_eq!(r.route("dog").backend, BackendKind::Apps);
    }
}
