//! livery - diagnostics for onboarding vehicle assets
//!
//! # Commands
//!
//! - `livery vehicles` - List catalog entries and their rule overlaps
//! - `livery inspect` - Resolve a scene file and print regions, baseline
//!   colors and camera framing
//! - `livery paint` - Apply region colors to a scene file and write it out

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use livery::app::{ConfiguratorSession, ViewerSettings};
use livery::catalog::RegionCatalog;
use livery::material::Color;
use livery::region::SemanticRegion;
use livery::scene::serialization::{
    load_catalog_from_file, load_scene_from_file, load_settings_from_file, save_scene_to_file,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "livery")]
#[command(about = "Region resolution diagnostics for vehicle assets")]
#[command(version)]
struct Cli {
    /// Catalog JSON file (defaults to the built-in catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog entries and their rule overlaps
    Vehicles,

    /// Resolve a scene and print regions, baseline colors and framing
    Inspect(InspectArgs),

    /// Apply region colors to a scene and write the result
    Paint(PaintArgs),
}

#[derive(Args)]
struct SceneArgs {
    /// Scene JSON file
    scene: PathBuf,

    /// Catalog key, e.g. BMW_M3
    #[arg(short, long)]
    vehicle: Option<String>,

    /// Viewer settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[derive(Args)]
struct InspectArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PaintArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output scene JSON file
    #[arg(short, long)]
    output: PathBuf,

    #[arg(long, value_name = "HEX")]
    body: Option<Color>,
    #[arg(long, value_name = "HEX")]
    wheel: Option<Color>,
    #[arg(long, value_name = "HEX")]
    drl: Option<Color>,
    #[arg(long, value_name = "HEX")]
    interior_primary: Option<Color>,
    #[arg(long, value_name = "HEX")]
    interior_secondary: Option<Color>,
    #[arg(long, value_name = "HEX")]
    glass: Option<Color>,
}

impl PaintArgs {
    fn selected(&self) -> Vec<(SemanticRegion, Color)> {
        [
            (SemanticRegion::Body, self.body),
            (SemanticRegion::Wheel, self.wheel),
            (SemanticRegion::Drl, self.drl),
            (SemanticRegion::InteriorPrimary, self.interior_primary),
            (SemanticRegion::InteriorSecondary, self.interior_secondary),
            (SemanticRegion::Glass, self.glass),
        ]
        .into_iter()
        .filter_map(|(region, color)| color.map(|color| (region, color)))
        .collect()
    }
}

#[derive(serde::Serialize)]
struct NodeReport<'a> {
    node: &'a str,
    region: SemanticRegion,
    rule: livery::resolve::MatchRule,
    isolate: bool,
}

#[derive(serde::Serialize)]
struct InspectReport<'a> {
    vehicle: &'a str,
    nodes: Vec<NodeReport<'a>>,
    snapshot: &'a livery::snapshot::AppearanceSnapshot,
    framing: &'a livery::render::Framing,
    ambiguities: Vec<String>,
}

fn load_catalog(path: Option<&PathBuf>) -> Result<RegionCatalog> {
    match path {
        Some(path) => load_catalog_from_file(path)
            .with_context(|| format!("failed to load catalog {}", path.display())),
        None => Ok(RegionCatalog::builtin()),
    }
}

fn open_session(catalog: &RegionCatalog, args: &SceneArgs) -> Result<ConfiguratorSession> {
    let settings = match &args.settings {
        Some(path) => load_settings_from_file(path)
            .with_context(|| format!("failed to load settings {}", path.display()))?,
        None => ViewerSettings::default(),
    };
    let scene = load_scene_from_file(&args.scene)
        .with_context(|| format!("failed to load scene {}", args.scene.display()))?;
    let key = args.vehicle.as_deref().unwrap_or(catalog.default_key());
    let vehicle = catalog.resolve_key(key).to_string();
    let entry = catalog.lookup(&vehicle).clone();
    Ok(ConfiguratorSession::load(
        vehicle,
        entry,
        scene,
        &settings,
    ))
}

fn vehicles(catalog: &RegionCatalog) {
    for key in catalog.keys() {
        let entry = catalog.lookup(key);
        let marker = if key == catalog.default_key() { " (default)" } else { "" };
        println!("{key}{marker}: {}", entry.model_file);
        for finding in entry.ambiguities() {
            println!("  overlap: {finding}");
        }
    }
}

fn inspect(catalog: &RegionCatalog, args: &InspectArgs) -> Result<()> {
    let session = open_session(catalog, &args.scene)?;
    let scene = session.scene();
    let nodes: Vec<NodeReport> = session
        .resolution()
        .iter()
        .filter_map(|(id, found)| {
            Some(NodeReport {
                node: scene.node(id)?.name.as_str(),
                region: found.region,
                rule: found.rule,
                isolate: found.isolate,
            })
        })
        .collect();

    if args.json {
        let report = InspectReport {
            vehicle: session.vehicle(),
            nodes,
            snapshot: session.snapshot(),
            framing: session.framing(),
            ambiguities: session
                .entry()
                .ambiguities()
                .iter()
                .map(ToString::to_string)
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Vehicle: {}", session.vehicle());
    println!("Resolved nodes:");
    for node in &nodes {
        let isolate = if node.isolate { " [isolated]" } else { "" };
        println!("  {:<40} {:<20} {:?}{isolate}", node.node, node.region, node.rule);
    }
    println!("Baseline colors:");
    for region in SemanticRegion::ALL {
        match session.snapshot().get(region) {
            Some(color) => println!("  {:<20} {color}", region),
            None => println!("  {:<20} (unresolved)", region),
        }
    }
    let framing = session.framing();
    println!("Framing:");
    println!("  root translation {:?}", framing.root.translation);
    println!("  root scale       {:?}", framing.root.scale);
    println!("  camera position  {:?}", framing.camera.position);
    println!("  camera look-at   {:?}", framing.camera.look_at);
    for finding in session.entry().ambiguities() {
        println!("Overlap: {finding}");
    }
    Ok(())
}

fn paint(catalog: &RegionCatalog, args: &PaintArgs) -> Result<()> {
    let mut session = open_session(catalog, &args.scene)?;
    // Regions not given on the command line keep their authored materials.
    for (region, color) in args.selected() {
        session.select(region, color);
    }

    let report = session.apply();
    log::info!(
        "{} writes, {} unchanged, {} clones, {} glow materials",
        report.writes,
        report.skipped,
        report.clones_created,
        report.replaced
    );
    save_scene_to_file(session.scene(), &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let catalog = load_catalog(cli.catalog.as_ref())?;

    match &cli.command {
        Commands::Vehicles => {
            vehicles(&catalog);
            Ok(())
        }
        Commands::Inspect(args) => inspect(&catalog, args),
        Commands::Paint(args) => paint(&catalog, args),
    }
}
