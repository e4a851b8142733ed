use anyhow::Context;

use crate::{api::SortKey, OrphanPolicy};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Settings {
    /// Sort applied to freshly loaded comment trees
    pub default_sort: SortKey,
    pub orphan_policy: OrphanPolicy,
}

impl Settings {
    /// Reads `MLEM_COMMENT_SORT` and `MLEM_ORPHAN_POLICY`, defaulting unset ones
    pub fn from_env() -> anyhow::Result<Settings> {
        Settings::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Settings> {
        let mut settings = Settings::default();
        if let Some(sort) = var("MLEM_COMMENT_SORT") {
            settings.default_sort = sort
                .parse::<SortKey>()
                .with_context(|| format!("parsing MLEM_COMMENT_SORT {sort:?}"))?;
        }
        if let Some(policy) = var("MLEM_ORPHAN_POLICY") {
            settings.orphan_policy = policy
                .parse::<OrphanPolicy>()
                .with_context(|| format!("parsing MLEM_ORPHAN_POLICY {policy:?}"))?;
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        Settings::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let s = from(&[]).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.default_sort, SortKey::Hot);
        assert_eq!(s.orphan_policy, OrphanPolicy::Promote);
    }

    #[test]
    fn overrides() {
        let s = from(&[("MLEM_COMMENT_SORT", "new"), ("MLEM_ORPHAN_POLICY", "discard")]).unwrap();
        assert_eq!(s.default_sort, SortKey::New);
        assert_eq!(s.orphan_policy, OrphanPolicy::Discard);
    }

    #[test]
    fn bad_values() {
        let err = from(&[("MLEM_COMMENT_SORT", "best")]).unwrap_err();
        assert!(format!("{err:#}").contains("MLEM_COMMENT_SORT"));
        assert!(from(&[("MLEM_ORPHAN_POLICY", "maybe")]).is_err());
    }

    #[test]
    fn deserializes_partially() {
        let s: Settings = serde_json::from_str(r#"{"default_sort":"Top"}"#).unwrap();
        assert_eq!(s.default_sort, SortKey::Top);
        assert_eq!(s.orphan_policy, OrphanPolicy::Promote);
        let s: Settings = serde_json::from_str(r#"{"orphan_policy":"discard"}"#).unwrap();
        assert_eq!(s.orphan_policy, OrphanPolicy::Discard);
    }
}
