//! Serialization of parse results to JSON or YAML.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::OutputFormat;
use crate::error::Result;
use crate::types::ParseResult;

/// Render a result as a document string.
///
/// JSON is pretty-printed; YAML starts with a document marker. Both end
/// with a newline and embed nothing beyond the result itself, so equal
/// inputs give byte-identical output.
pub fn render(result: &ParseResult, format: OutputFormat) -> Result<String> {
    let body = match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Yaml => format!("---\n{}", serde_yaml_ng::to_string(result)?),
    };
    Ok(format!("{}\n", body.trim_end_matches('\n')))
}

/// Write a result to `path`.
///
/// Writes to a temp file next to the target, syncs, then renames, so an
/// interrupted run never leaves a half-written document behind.
pub fn write_result(result: &ParseResult, path: &Path, format: OutputFormat) -> Result<()> {
    let content = render(result, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .map_or_else(|| "output".into(), |name| name.to_string_lossy());
    let temp_file = path.with_file_name(format!(".{file_name}.tmp"));
    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }

    fs::rename(&temp_file, path)?;
    tracing::debug!(path = %path.display(), "result written");
    Ok(())
}

/// Output file for an act inside `dir`, named after its URN.
///
/// # Examples
/// ```
/// use atlas_parser::output::{output_path, OutputFormat};
/// use std::path::Path;
///
/// let path = output_path(Path::new("out"), "br;go;goiania;lei;2023-03-10;1", OutputFormat::Json);
/// assert_eq!(path, Path::new("out/br_go_goiania_lei_2023-03-10_1.json"));
/// ```
#[must_use]
pub fn output_path(dir: &Path, urn: &str, format: OutputFormat) -> PathBuf {
    let stem: String = urn
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    dir.join(format!("{stem}.{}", format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::parser::parse_act;
    use crate::types::RawAct;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample() -> ParseResult {
        let act = RawAct::new(
            "br;go;goiania;lei;2023-03-10;1",
            "Art. 1º Fica instituído o programa. § 1º O programa é gratuito.",
        );
        parse_act(&act, &ParserConfig::default()).unwrap()
    }

    #[test]
    fn test_render_json_uses_portuguese_keys() {
        let json = render(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["fonte"]["urn"], "br;go;goiania;lei;2023-03-10;1");
        assert_eq!(value["dispositivos"][0]["tipo"], "artigo");
        assert_eq!(value["dispositivos"][0]["rotulo"], "Art. 1º");
        assert_eq!(value["dispositivos"][0]["filhos"][0]["caminho_estrutural"], "art1/p1");
        assert_eq!(value["confianca"], 1.0);
        assert!(json.ends_with("}\n"));
    }

    #[test]
    fn test_render_yaml() {
        let yaml = render(&sample(), OutputFormat::Yaml).unwrap();
        assert!(yaml.starts_with("---\n"));
        assert!(yaml.contains("dispositivos:"));
        assert!(yaml.contains("caminho_estrutural: art1/p1"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = render(&sample(), OutputFormat::Json).unwrap();
        let b = render(&sample(), OutputFormat::Json).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_json_round_trip() {
        let result = sample();
        let json = render(&result, OutputFormat::Json).unwrap();
        let back: ParseResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_write_result_creates_dirs_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("act.json");
        write_result(&sample(), &path, OutputFormat::Json).unwrap();

        assert!(path.exists());
        let entries: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_output_path_sanitizes_urn() {
        let path = output_path(Path::new("out"), "urn:lex:br:federal:lei:2020;14010", OutputFormat::Yaml);
        assert_eq!(path, Path::new("out/urn_lex_br_federal_lei_2020_14010.yaml"));
    }
}
