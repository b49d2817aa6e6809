use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use dimspace::{DimensionSpace, DimensionSpacePoint, VariantType};

/// Query a content dimension space
#[derive(Parser, Debug)]
#[command(name = "dimspace")]
#[command(about = "Query allowed dimension combinations, specializations and fallbacks", long_about = None)]
struct Args {
    /// Path to the JSON dimension configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every allowed dimension space point
    Combinations,
    /// Check whether a point is in the allowed subspace
    Allowed { point: String },
    /// Print the per-dimension specialization depths of a point
    Weight { point: String },
    /// Compare two points in the specialization order
    Compare { a: String, b: String },
    /// List the specializations of a point
    Specializations {
        point: String,
        #[arg(long)]
        include_self: bool,
    },
    /// List the generalizations of a point
    Generalizations {
        point: String,
        #[arg(long)]
        include_self: bool,
    },
    /// Print the primary generalization chain of a point
    Fallback { point: String },
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Comparison {
    /// `null` for peers, which the specialization order leaves unordered
    ordering: Option<&'static str>,
    variant_type: VariantType,
}

fn compare(space: &DimensionSpace, a: &DimensionSpacePoint, b: &DimensionSpacePoint) -> anyhow::Result<Comparison> {
    let variant_type = space.variant_type(a, b)?;
    let ordering = match variant_type {
        VariantType::Same => Some("equal"),
        VariantType::Generalization => Some("less"),
        VariantType::Specialization => Some("greater"),
        VariantType::Peer => None,
    };
    Ok(Comparison { ordering, variant_type })
}

fn parse_point(raw: &str) -> anyhow::Result<DimensionSpacePoint> {
    DimensionSpacePoint::from_json(raw).with_context(|| format!("invalid dimension space point: {}", raw))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(space: &DimensionSpace, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Combinations => print_json(space.allowed_combinations()),
        Command::Allowed { point } => {
            let point = parse_point(&point)?;
            print_json(&serde_json::json!({ "point": point, "allowed": space.is_allowed(&point) }))
        }
        Command::Weight { point } => print_json(&space.weight(&parse_point(&point)?)?),
        Command::Compare { a, b } => print_json(&compare(space, &parse_point(&a)?, &parse_point(&b)?)?),
        Command::Specializations { point, include_self } => {
            print_json(&space.specializations(&parse_point(&point)?, include_self)?)
        }
        Command::Generalizations { point, include_self } => {
            print_json(&space.generalizations(&parse_point(&point)?, include_self)?)
        }
        Command::Fallback { point } => print_json(&space.fallback_chain(&parse_point(&point)?)?),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries the JSON results
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting dimspace v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {:?}", args.config);

    let space = dimspace::config::load(&args.config)
        .with_context(|| format!("failed to build dimension space from {:?}", args.config))?;

    run(&space, args.command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimspace::config::DimensionSpaceDescriptor;

    const MARKETS: &str = r#"{"dimensions": [{
        "identifier": "market",
        "default": "WORLD",
        "values": [
            {"value": "WORLD"},
            {"value": "GB", "generalization": "WORLD"},
            {"value": "DE", "generalization": "WORLD"}
        ]
    }]}"#;

    #[test]
    fn test_compare_reports_peers() {
        let space = DimensionSpaceDescriptor::from_json_str(MARKETS).unwrap().build().unwrap();
        let (world, gb, de) = (
            parse_point(r#"{"market": "WORLD"}"#).unwrap(),
            parse_point(r#"{"market": "GB"}"#).unwrap(),
            parse_point(r#"{"market": "DE"}"#).unwrap(),
        );

        let peers = compare(&space, &gb, &de).unwrap();
        assert_eq!(peers, Comparison { ordering: None, variant_type: VariantType::Peer });
        assert_eq!(
            serde_json::to_value(&peers).unwrap(),
            serde_json::json!({"ordering": null, "variantType": "peer"})
        );

        assert_eq!(
            compare(&space, &gb, &world).unwrap(),
            Comparison { ordering: Some("greater"), variant_type: VariantType::Specialization }
        );
        assert_eq!(compare(&space, &world, &world).unwrap().ordering, Some("equal"));
        assert!(compare(&space, &parse_point(r#"{"market": "FR"}"#).unwrap(), &world).is_err());
    }
}
