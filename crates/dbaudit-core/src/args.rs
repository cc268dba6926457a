//! Argument encoding for the analysis tool's invocation contract.
//!
//! Pure construction of the ordered argument vector from an
//! [`AnalysisConfig`]. Free-form fields are base64-encoded so the tool is
//! solely responsible for decoding them; nothing here touches the shell.
//! Object and folder lists serialize into one comma-joined token each,
//! with every element field individually encoded so the token parses back
//! unambiguously.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::config::{AnalysisConfig, DbObject, ObjectFolder};

/// Encode a free-form field for safe transport on the command line.
pub fn encode_field(value: &str) -> String {
    BASE64.encode(value.as_bytes())
}

/// Decode a token produced by [`encode_field`].
///
/// Returns `None` when the token is not base64 over valid UTF-8.
pub fn decode_field(token: &str) -> Option<String> {
    let bytes = BASE64.decode(token).ok()?;
    String::from_utf8(bytes).ok()
}

/// Build the complete argument vector for one invocation.
///
/// `report_dir` is the private workspace directory the tool writes its
/// reports into; the caller-facing destination is the harvester's concern,
/// not the tool's. Total over well-formed input, no side effects.
pub fn encode_args(config: &AnalysisConfig, report_dir: &Path) -> Vec<String> {
    let mut args = Vec::new();

    args.push("-connection".to_string());
    args.push(encode_field(&config.connection));

    if !config.objects.is_empty() {
        args.push("-objects".to_string());
        args.push(join_objects(&config.objects));
    }

    if !config.folders.is_empty() {
        args.push("-folders".to_string());
        args.push(join_folders(&config.folders));
    }

    args.push("-ruleSet".to_string());
    args.push(config.rule_set.to_string());

    if !config.report.name.is_empty() {
        args.push("-reportName".to_string());
        args.push(encode_field(&config.report.name));
    }

    args.push("-reportFolder".to_string());
    args.push(encode_field(&report_dir.to_string_lossy()));

    if config.report.html {
        args.push("-html".to_string());
    }
    if config.report.json {
        args.push("-json".to_string());
    }
    if config.report.xls {
        args.push("-xls".to_string());
    }
    if config.report.xml {
        args.push("-xml".to_string());
    }

    let fail = &config.fail_conditions;
    args.push("-halstead".to_string());
    args.push(fail.halstead.to_string());
    args.push("-maintainability".to_string());
    args.push(fail.maintainability.to_string());
    args.push("-mcCabe".to_string());
    args.push(fail.mccabe.to_string());
    args.push("-TCR".to_string());
    args.push(fail.tcr.to_string());

    if fail.rule_violations {
        args.push("-ruleViolations".to_string());
    }
    if fail.syntax_errors {
        args.push("-syntaxErrors".to_string());
    }
    if fail.ignore_wrapped_packages {
        args.push("-ignoreWrappedPackages".to_string());
    }

    args
}

fn join_objects(objects: &[DbObject]) -> String {
    objects
        .iter()
        .map(|o| {
            format!(
                "{}:{}:{}",
                encode_field(&o.name),
                encode_field(&o.owner),
                encode_field(&o.kind)
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn join_folders(folders: &[ObjectFolder]) -> String {
    folders
        .iter()
        .map(|f| {
            format!(
                "{}:{}:{}",
                encode_field(&f.path),
                encode_field(&f.filter),
                if f.recurse { "1" } else { "0" }
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse an `-objects` token back into its ordered element list.
///
/// Inverse of the encoder's serialization; used to verify round-trips.
pub fn parse_objects(token: &str) -> Option<Vec<DbObject>> {
    token
        .split(',')
        .map(|element| {
            let mut fields = element.split(':');
            let name = decode_field(fields.next()?)?;
            let owner = decode_field(fields.next()?)?;
            let kind = decode_field(fields.next()?)?;
            if fields.next().is_some() {
                return None;
            }
            Some(DbObject { name, owner, kind })
        })
        .collect()
}

/// Parse a `-folders` token back into its ordered element list.
pub fn parse_folders(token: &str) -> Option<Vec<ObjectFolder>> {
    token
        .split(',')
        .map(|element| {
            let mut fields = element.split(':');
            let path = decode_field(fields.next()?)?;
            let filter = decode_field(fields.next()?)?;
            let recurse = match fields.next()? {
                "1" => true,
                "0" => false,
                _ => return None,
            };
            if fields.next().is_some() {
                return None;
            }
            Some(ObjectFolder {
                path,
                filter,
                recurse,
            })
        })
        .collect()
}
