use serde::{Deserialize, Serialize};

/// ## Structure
/// This module contains the data structures for the import plan file.
///
/// ```text
/// Plan
///   ├── import: ImportConfig
///   │   └── profiles: Vec<ImportProfile>
///   │       └── filename: String
///   ├── known: KnownRecords
///   │   ├── coops: Vec<String>
///   │   ├── birds: Vec<KnownBird>
///   │   └── breeds: Vec<String>
///   └── report: Option<String>
/// ```
///
/// The `known` section lists the records that already exist in the flock
/// database, so a dry run resolves coop and parent references the same way
/// a live import would.

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Plan {
    pub import: ImportConfig,
    #[serde(default)]
    pub known: KnownRecords,
    /// Optional path for the JSON import report.
    #[serde(default)]
    pub report: Option<String>,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            import: ImportConfig {
                profiles: vec![ImportProfile {
                    filename: "birds.csv".to_string(),
                }],
            },
            known: KnownRecords::default(),
            report: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ImportConfig {
    pub profiles: Vec<ImportProfile>,
}

/// One spreadsheet to import. Profiles are processed in order and share one
/// lookup context, so a later file may reference birds from an earlier one.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ImportProfile {
    pub filename: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct KnownRecords {
    #[serde(default)]
    pub coops: Vec<String>,
    #[serde(default)]
    pub birds: Vec<KnownBird>,
    #[serde(default)]
    pub breeds: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct KnownBird {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub band: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization() {
        let plan = Plan::default();
        let yaml = serde_yaml::to_string(&plan).unwrap();
        assert!(yaml.contains("profiles"));
        assert!(yaml.contains("birds.csv"));
    }

    #[test]
    fn test_deserialization() {
        let yaml = r#"
import:
  profiles:
    - filename: "spring_hatch.csv"
known:
  coops: ["Brood Pen A", "Grow-out"]
  birds:
    - name: "Old Man"
      band: "B-0001"
    - band: "B-0002"
  breeds: ["Kelso"]
report: "report.json"
"#;

        let plan: Plan = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(plan.import.profiles.len(), 1);
        assert_eq!(plan.import.profiles[0].filename, "spring_hatch.csv");
        assert_eq!(plan.known.coops.len(), 2);
        assert_eq!(plan.known.birds[0].name.as_deref(), Some("Old Man"));
        assert_eq!(plan.known.birds[1].band.as_deref(), Some("B-0002"));
        assert_eq!(plan.report.as_deref(), Some("report.json"));
    }

    #[test]
    fn known_section_is_optional() {
        let yaml = r#"
import:
  profiles:
    - filename: "birds.csv"
"#;
        let plan: Plan = serde_yaml::from_str(yaml).unwrap();
        assert!(plan.known.coops.is_empty());
        assert!(plan.report.is_none());
    }
}
