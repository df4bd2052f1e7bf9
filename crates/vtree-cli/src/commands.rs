use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use vtree_diff::{ReconcileConfig, Reconciler};
use vtree_host::{MemoryHost, Mutation, MutationStats};
use vtree_types::VNode;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let reconciler = Reconciler::new(load_config(cli.config.as_deref())?);
    match cli.command {
        Command::Render(args) => cmd_render(&reconciler, args, &cli.format),
        Command::Diff(args) => cmd_diff(&reconciler, args, &cli.format),
    }
}

/// Outcome of reconciling one tree against another.
#[derive(Debug, Serialize)]
pub struct DiffReport {
    pub mutations: Vec<Mutation>,
    pub stats: MutationStats,
    pub markup: String,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ReconcileConfig> {
    let Some(path) = path else {
        return Ok(ReconcileConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    ReconcileConfig::from_toml_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn load_tree(path: &Path) -> anyhow::Result<VNode> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading tree {}", path.display()))?;
    VNode::from_json_str(&text).with_context(|| format!("parsing tree {}", path.display()))
}

/// Render `tree` into a fresh host and return its markup.
pub fn render_tree(reconciler: &Reconciler, tree: &VNode) -> anyhow::Result<String> {
    let mut host = MemoryHost::new();
    let root = host.create_root();
    reconciler.diff(&mut host, tree, &root, None, None)?;
    Ok(host.to_markup(root))
}

/// Render `old`, then reconcile `new` against it, journaling only the
/// second pass.
pub fn reconcile_trees(reconciler: &Reconciler, old: &VNode, new: &VNode) -> anyhow::Result<DiffReport> {
    let mut host = MemoryHost::new();
    let root = host.create_root();
    let node = reconciler.diff(&mut host, old, &root, None, None)?;
    host.clear_journal();

    reconciler.diff(&mut host, new, &root, Some(old), Some(&node))?;
    let stats = host.stats();
    Ok(DiffReport {
        mutations: host.take_journal(),
        stats,
        markup: host.to_markup(root),
    })
}

fn cmd_render(reconciler: &Reconciler, args: RenderArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let tree = load_tree(&args.tree)?;
    let markup = render_tree(reconciler, &tree)?;
    match format {
        OutputFormat::Text => println!("{markup}"),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "markup": markup }))?)
        }
    }
    Ok(())
}

fn cmd_diff(reconciler: &Reconciler, args: DiffArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let old = load_tree(&args.old)?;
    let new = load_tree(&args.new)?;
    let report = reconcile_trees(reconciler, &old, &new)?;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.mutations.is_empty() {
        println!("{} No mutations.", "✓".green().bold());
    }
    for m in &report.mutations {
        println!("  {}", paint(m));
    }
    if !args.no_markup {
        println!("{}", report.markup);
    }
    let s = &report.stats;
    println!(
        "{} mutations: {} created, {} removed, {} placed, {} text, {} set, {} unset",
        s.total().to_string().bold(),
        s.created,
        s.removals,
        s.placements,
        s.text_updates,
        s.properties_set,
        s.properties_removed,
    );
    Ok(())
}

fn paint(m: &Mutation) -> colored::ColoredString {
    let line = m.to_string();
    match m {
        Mutation::CreateNode { .. } | Mutation::CreateText { .. } => line.green(),
        Mutation::Remove { .. } => line.red(),
        Mutation::Append { .. } | Mutation::InsertBefore { .. } => line.cyan(),
        _ => line.yellow(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn render_from_json() {
        let tree = VNode::from_json_str(r#"{"tag":"p","props":{"class":"x"},"children":["hi",null]}"#).unwrap();
        let markup = render_tree(&Reconciler::default(), &tree).unwrap();
        assert_eq!(markup, r#"<p class="x">hi</p>"#);
    }

    #[test]
    fn keyed_reorder_report() {
        let old = VNode::from_json_str(
            r#"{"tag":"ul","children":[
                {"tag":"li","key":1,"children":["a"]},
                {"tag":"li","key":2,"children":["b"]}
            ]}"#,
        )
        .unwrap();
        let new = VNode::from_json_str(
            r#"{"tag":"ul","children":[
                {"tag":"li","key":2,"children":["b"]},
                {"tag":"li","key":1,"children":["a"]}
            ]}"#,
        )
        .unwrap();

        let report = reconcile_trees(&Reconciler::default(), &old, &new).unwrap();
        assert_eq!(report.stats.created, 0);
        assert_eq!(report.markup, "<ul><li>b</li><li>a</li></ul>");
        assert_eq!(report.mutations.len(), report.stats.total());
    }

    #[test]
    fn identical_trees_report_nothing() {
        let tree = VNode::from_json_str(r#"{"tag":"div","children":["same"]}"#).unwrap();
        let report = reconcile_trees(&Reconciler::default(), &tree, &tree).unwrap();
        assert!(report.mutations.is_empty());
        assert_eq!(report.stats, MutationStats::default());
    }

    #[test]
    fn load_tree_from_file() {
        let file = write_temp(r#"{"tag":"b","children":[1]}"#);
        let tree = load_tree(file.path()).unwrap();
        assert_eq!(render_tree(&Reconciler::default(), &tree).unwrap(), "<b>1</b>");
    }

    #[test]
    fn load_tree_reports_path_on_error() {
        let file = write_temp("{not json");
        let err = load_tree(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing tree"));
    }

    #[test]
    fn load_config_from_file() {
        let file = write_temp("live_properties = [\"value\"]\n");
        let config = load_config(Some(file.path())).unwrap();
        assert!(config.is_live("value"));
        assert!(!config.is_live("checked"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("reading config"));
    }

    #[test]
    fn no_config_means_defaults() {
        assert_eq!(load_config(None).unwrap(), ReconcileConfig::default());
    }
}
