use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use uci_codec::DeltaCodec;
use uci_diff::{apply, diff, revert, Delta};
use uci_types::Tree;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli, config: &CliConfig) -> anyhow::Result<()> {
    let codec = DeltaCodec::new(config.codec.clone());
    match cli.command {
        Command::Diff(args) => {
            let out = cmd_diff(&args.old, &args.new, &codec, cli.format)?;
            emit(out, args.output.as_deref())
        }
        Command::Apply(args) => {
            let out = cmd_patch(&args.tree, &args.delta, &codec, cli.format, Direction::Apply)?;
            emit(out, args.output.as_deref())
        }
        Command::Revert(args) => {
            let out = cmd_patch(&args.tree, &args.delta, &codec, cli.format, Direction::Revert)?;
            emit(out, args.output.as_deref())
        }
        Command::Render(args) => emit(load_tree(&args.tree)?.render(), None),
        Command::Export(args) => emit(tree_json(&load_tree(&args.tree)?, &codec)?, None),
    }
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Apply,
    Revert,
}

fn cmd_diff(old: &Path, new: &Path, codec: &DeltaCodec, format: OutputFormat) -> anyhow::Result<String> {
    let old = load_tree(old)?;
    let new = load_tree(new)?;
    let delta = diff(&old, &new);
    match format {
        OutputFormat::Json => Ok(codec.encode_to_string(&delta)?),
        OutputFormat::Text => Ok(summarize(&delta)),
    }
}

fn cmd_patch(
    tree: &Path,
    delta: &Path,
    codec: &DeltaCodec,
    format: OutputFormat,
    direction: Direction,
) -> anyhow::Result<String> {
    let mut tree = load_tree(tree)?;
    let text = std::fs::read_to_string(delta)
        .with_context(|| format!("reading delta {}", delta.display()))?;
    let delta = codec
        .decode_str(&text)
        .with_context(|| format!("decoding delta {}", delta.display()))?;

    match direction {
        Direction::Apply => apply(&delta, &mut tree)?,
        Direction::Revert => revert(&delta, &mut tree)?,
    }
    tracing::info!(?direction, stats = %delta.stats(), "patched tree");

    match format {
        OutputFormat::Json => tree_json(&tree, codec),
        OutputFormat::Text => Ok(tree.render()),
    }
}

fn load_tree(path: &Path) -> anyhow::Result<Tree> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading tree {}", path.display()))?;
    Tree::from_json(&text).with_context(|| format!("parsing tree {}", path.display()))
}

fn tree_json(tree: &Tree, codec: &DeltaCodec) -> anyhow::Result<String> {
    let export = tree.to_export();
    let out = if codec.config().pretty {
        serde_json::to_string_pretty(&export)?
    } else {
        serde_json::to_string(&export)?
    };
    Ok(out)
}

fn emit(mut out: String, path: Option<&Path>) -> anyhow::Result<()> {
    if !out.ends_with('\n') {
        out.push('\n');
    }
    match path {
        Some(path) => std::fs::write(path, out)
            .with_context(|| format!("writing {}", path.display())),
        None => {
            print!("{out}");
            Ok(())
        }
    }
}

/// One line per bucket entry, then the per-bucket counts.
fn summarize(delta: &Delta) -> String {
    let mut out = String::new();
    for name in delta.new_packages.keys() {
        let _ = writeln!(out, "{} package {}", "+".green(), name.bold());
    }
    for name in delta.old_packages.keys() {
        let _ = writeln!(out, "{} package {}", "-".red(), name.bold());
    }
    for key in delta.new_sections.keys() {
        let _ = writeln!(out, "{} section {}", "+".green(), key);
    }
    for key in delta.old_sections.keys() {
        let _ = writeln!(out, "{} section {}", "-".red(), key);
    }
    for (key, value) in &delta.new_options {
        let _ = writeln!(out, "{} option {} = {}", "+".green(), key, value);
    }
    for (key, value) in &delta.old_options {
        let _ = writeln!(out, "{} option {} = {}", "-".red(), key, value);
    }
    for (key, change) in &delta.changed_options {
        let _ = writeln!(
            out,
            "{} option {}: {} -> {}",
            "~".yellow(),
            key,
            change.old,
            change.new
        );
    }
    if delta.is_empty() {
        out.push_str("No changes.\n");
    } else {
        let _ = writeln!(out, "{}", delta.stats().to_string().dimmed());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uci_codec::CodecConfig;

    const OLD: &str = r#"{
        "dhcp": {"values": {
            "lan": {".type": "dhcp", ".name": "lan", ".anonymous": false, "interface": "lan"},
            "wan": {".type": "dhcp", ".name": "wan", ".anonymous": false, "interface": "wan", "ignore": "1"}
        }}
    }"#;

    const NEW: &str = r#"{
        "dhcp": {"values": {
            "lan": {".type": "dhcp", ".name": "lan", ".anonymous": false, "interface": "lan"},
            "wan": {".type": "dhcp", ".name": "wan", ".anonymous": false, "interface": "wan"}
        }},
        "system": {"values": {
            "cfg01": {".type": "system", ".name": "cfg01", ".anonymous": true, "hostname": "gw"}
        }}
    }"#;

    fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn diff_apply_revert_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let old = write(dir.path(), "old.json", OLD);
        let new = write(dir.path(), "new.json", NEW);
        let codec = DeltaCodec::default();

        let delta = cmd_diff(&old, &new, &codec, OutputFormat::Json).unwrap();
        let delta_path = write(dir.path(), "delta.json", &delta);

        let applied = cmd_patch(&old, &delta_path, &codec, OutputFormat::Json, Direction::Apply).unwrap();
        assert_eq!(Tree::from_json(&applied).unwrap(), Tree::from_json(NEW).unwrap());

        let new_path = write(dir.path(), "applied.json", &applied);
        let reverted =
            cmd_patch(&new_path, &delta_path, &codec, OutputFormat::Json, Direction::Revert).unwrap();
        assert_eq!(Tree::from_json(&reverted).unwrap(), Tree::from_json(OLD).unwrap());
    }

    #[test]
    fn bare_scheme_diff_output() {
        let dir = tempfile::tempdir().unwrap();
        let old = write(dir.path(), "old.json", OLD);
        let new = write(dir.path(), "new.json", NEW);
        let codec = DeltaCodec::new(CodecConfig::legacy());

        let out = cmd_diff(&old, &new, &codec, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["oldOptions"]["ignore"]["config"], "wan");
        assert!(value["newpackages"]["system"].is_object());
    }

    #[test]
    fn text_summary_lists_entries() {
        let dir = tempfile::tempdir().unwrap();
        let old = write(dir.path(), "old.json", OLD);
        let new = write(dir.path(), "new.json", NEW);

        let out = cmd_diff(&old, &new, &DeltaCodec::default(), OutputFormat::Text).unwrap();
        assert!(out.contains("package"));
        assert!(out.contains("system"));
        assert!(out.contains("dhcp.wan.ignore = '1'"));

        let same = cmd_diff(&old, &old, &DeltaCodec::default(), OutputFormat::Text).unwrap();
        assert_eq!(same, "No changes.\n");
    }

    #[test]
    fn apply_text_format_renders_uci() {
        let dir = tempfile::tempdir().unwrap();
        let old = write(dir.path(), "old.json", OLD);
        let new = write(dir.path(), "new.json", NEW);
        let codec = DeltaCodec::default();
        let delta = write(
            dir.path(),
            "delta.json",
            &cmd_diff(&old, &new, &codec, OutputFormat::Json).unwrap(),
        );

        let out = cmd_patch(&old, &delta, &codec, OutputFormat::Text, Direction::Apply).unwrap();
        assert!(out.contains("package 'system'"));
        assert!(out.contains("config 'system'\n\toption 'hostname' 'gw'"));
        assert!(!out.contains("option 'ignore'"));
    }

    #[test]
    fn malformed_delta_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let old = write(dir.path(), "old.json", OLD);
        let delta = write(dir.path(), "delta.json", "{\"newpackages\": {}}");
        let err = cmd_patch(&old, &delta, &DeltaCodec::default(), OutputFormat::Json, Direction::Apply)
            .unwrap_err();
        assert!(err.to_string().contains("decoding delta"));
    }

    #[test]
    fn emit_writes_file_with_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        emit("hello".into(), Some(path.as_path())).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
