//! Route53 record models

/// A CNAME record set as submitted in an UPSERT change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnameRecord {
    pub name: String,
    pub value: String,
    pub ttl: i64,
}

impl CnameRecord {
    pub fn new(name: impl Into<String>, value: impl Into<String>, ttl: i64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ttl,
        }
    }
}

/// Strip the `/hostedzone/` prefix the console and some tooling include.
pub fn normalize_hosted_zone_id(hosted_zone_id: &str) -> &str {
    hosted_zone_id
        .trim()
        .trim_start_matches("/hostedzone/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_hosted_zone_id() {
        assert_eq!(normalize_hosted_zone_id("/hostedzone/Z123ABC"), "Z123ABC");
        assert_eq!(normalize_hosted_zone_id("Z123ABC"), "Z123ABC");
        assert_eq!(normalize_hosted_zone_id(" Z123ABC "), "Z123ABC");
    }
}
