//! Analysis invocation configuration.
//!
//! All string fields must be fully resolved before the configuration
//! reaches the runner; callers own any placeholder expansion. The core
//! never mutates a configuration it is handed.

use serde::{Deserialize, Serialize};

/// A single database object selected for analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DbObject {
    /// Object name.
    pub name: String,

    /// Owning schema.
    pub owner: String,

    /// Object type (e.g. `PROCEDURE`, `PACKAGE`).
    #[serde(rename = "type")]
    pub kind: String,
}

/// A folder of source files selected for analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectFolder {
    /// Folder path.
    pub path: String,

    /// File name filter (e.g. `*.sql`).
    pub filter: String,

    /// Whether to descend into subfolders.
    pub recurse: bool,
}

/// Report naming, destination, and output formats.
///
/// Format flags are independent; any subset (including none) is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportConfig {
    /// Base name shared by all generated report files.
    #[serde(default)]
    pub name: String,

    /// Destination folder the harvested reports are copied into.
    /// Empty disables harvesting.
    #[serde(default)]
    pub folder: String,

    #[serde(default)]
    pub html: bool,

    #[serde(default)]
    pub json: bool,

    #[serde(default)]
    pub xls: bool,

    #[serde(default)]
    pub xml: bool,
}

/// Thresholds and triggers the tool uses to judge a run failed.
///
/// Opaque to the runner; serialized into arguments verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailConditions {
    #[serde(default)]
    pub halstead: u32,

    #[serde(default)]
    pub maintainability: u32,

    #[serde(default)]
    pub mccabe: u32,

    #[serde(default)]
    pub tcr: u32,

    #[serde(default)]
    pub rule_violations: bool,

    #[serde(default)]
    pub syntax_errors: bool,

    #[serde(default)]
    pub ignore_wrapped_packages: bool,
}

/// Complete configuration for one analysis invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Opaque connection/credential string, passed to the tool encoded.
    #[serde(default)]
    pub connection: String,

    /// Database objects to analyze, in order.
    #[serde(default)]
    pub objects: Vec<DbObject>,

    /// Source folders to analyze, in order.
    #[serde(default)]
    pub folders: Vec<ObjectFolder>,

    /// Rule-set preset number (0-11). Passed through unvalidated;
    /// out-of-range values are the tool's concern.
    #[serde(default)]
    pub rule_set: u32,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub fail_conditions: FailConditions,
}

/// Built-in rule-set presets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    Top20,
    AllRules,
    CodeCorrectness,
    ControlStructures,
    CodeEfficiency,
    Informational,
    Maintainability,
    ProgramStructures,
    Readability,
    Severe,
    Variables,
    Warning,
}

impl RuleSet {
    /// Every preset, in code order.
    pub const ALL: [RuleSet; 12] = [
        RuleSet::Top20,
        RuleSet::AllRules,
        RuleSet::CodeCorrectness,
        RuleSet::ControlStructures,
        RuleSet::CodeEfficiency,
        RuleSet::Informational,
        RuleSet::Maintainability,
        RuleSet::ProgramStructures,
        RuleSet::Readability,
        RuleSet::Severe,
        RuleSet::Variables,
        RuleSet::Warning,
    ];

    /// Numeric code the tool expects for this preset.
    pub fn code(&self) -> u32 {
        match self {
            RuleSet::Top20 => 0,
            RuleSet::AllRules => 1,
            RuleSet::CodeCorrectness => 2,
            RuleSet::ControlStructures => 3,
            RuleSet::CodeEfficiency => 4,
            RuleSet::Informational => 5,
            RuleSet::Maintainability => 6,
            RuleSet::ProgramStructures => 7,
            RuleSet::Readability => 8,
            RuleSet::Severe => 9,
            RuleSet::Variables => 10,
            RuleSet::Warning => 11,
        }
    }

    /// Human-readable preset name.
    pub fn label(&self) -> &'static str {
        match self {
            RuleSet::Top20 => "Top 20",
            RuleSet::AllRules => "All Rules",
            RuleSet::CodeCorrectness => "Code Correctness",
            RuleSet::ControlStructures => "Control Structures",
            RuleSet::CodeEfficiency => "Code Efficiency",
            RuleSet::Informational => "Informational",
            RuleSet::Maintainability => "Maintainability",
            RuleSet::ProgramStructures => "Program Structures",
            RuleSet::Readability => "Readability",
            RuleSet::Severe => "Severe",
            RuleSet::Variables => "Variables",
            RuleSet::Warning => "Warning",
        }
    }

    /// Look a preset up by its numeric code.
    pub fn from_code(code: u32) -> Option<RuleSet> {
        RuleSet::ALL.into_iter().find(|r| r.code() == code)
    }
}
