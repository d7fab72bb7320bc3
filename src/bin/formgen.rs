//! Command-line interface for formgen
//! This binary fills in a form from the command line and writes it out as JSON, or loads
//! a saved document and shows each field the way the form would display it.
//!
//! Usage:
//!   formgen schema                                            - List fields by category
//!   formgen generate `<output>` [--set `<field>=<text>`]...       - Write a document
//!   formgen load `<input>` [--set `<field>=<text>`]... [--output `<file>`]
//!                                                             - Load, optionally edit and rewrite
//!
//! Global options: --config `<file>` layers a TOML file over the defaults, --annotated
//! switches to the annotated document variant.

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use formgen::form::document::{self, LoadReport, Variant, WriteReport};
use formgen::form::{FieldDescriptor, FormState, SchemaRegistry};
use formgen_config::Loader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let set_arg = Arg::new("set")
        .long("set")
        .short('s')
        .value_name("FIELD=TEXT")
        .help("Text for a field, exactly as it would be typed into the form")
        .action(ArgAction::Append);

    let matches = Command::new("formgen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fill in a typed form and save it as JSON")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML file layered over the built-in configuration"),
        )
        .arg(
            Arg::new("annotated")
                .long("annotated")
                .global(true)
                .help("Embed type and description in the document and enforce required fields")
                .action(ArgAction::SetTrue),
        )
        .subcommand(Command::new("schema").about("List the form's fields grouped by category"))
        .subcommand(
            Command::new("generate")
                .about("Write a document from field values")
                .arg(
                    Arg::new("output")
                        .help("Path of the JSON file to write")
                        .required(true)
                        .index(1),
                )
                .arg(set_arg.clone()),
        )
        .subcommand(
            Command::new("load")
                .about("Load a document and show its fields as the form would")
                .arg(
                    Arg::new("input")
                        .help("Path of the JSON file to load")
                        .required(true)
                        .index(1),
                )
                .arg(set_arg)
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Write the loaded (and edited) form to this file"),
                ),
        )
        .get_matches();

    let Some((name, sub_matches)) = matches.subcommand() else {
        unreachable!("a subcommand is required");
    };
    let (registry, variant) = load_schema(sub_matches)?;

    match name {
        "schema" => {
            handle_schema_command(&registry);
            Ok(())
        }
        "generate" => handle_generate_command(&registry, variant, sub_matches),
        "load" => handle_load_command(&registry, variant, sub_matches),
        _ => unreachable!(),
    }
}

/// Build the registry and document variant from defaults plus user overrides.
/// Global options are read from the subcommand's matches, where clap propagates them.
fn load_schema(matches: &ArgMatches) -> Result<(SchemaRegistry, Variant)> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if matches.get_flag("annotated") {
        loader = loader.set_override("document.variant", "annotated")?;
    }
    let config = loader.build().context("failed to load configuration")?;
    let registry =
        SchemaRegistry::from_config(&config.schema).context("invalid schema configuration")?;
    Ok((registry, config.document.variant.into()))
}

/// Apply every `--set FIELD=TEXT` to `form`
fn apply_sets(registry: &SchemaRegistry, form: &mut FormState, matches: &ArgMatches) -> Result<()> {
    for assignment in matches.get_many::<String>("set").into_iter().flatten() {
        let Some((id, text)) = assignment.split_once('=') else {
            bail!("expected FIELD=TEXT, got '{}'", assignment);
        };
        if !registry.contains(id) {
            bail!("unknown field '{}'", id);
        }
        form.set(id, text);
    }
    Ok(())
}

/// Handle the schema command
fn handle_schema_command(registry: &SchemaRegistry) {
    let id_width = registry.fields().map(|f| f.id.len()).max().unwrap_or(0);
    for (category, fields) in registry.categories() {
        println!("{}", category);
        for field in fields {
            let required = if field.required { "required" } else { "optional" };
            println!(
                "  {:id_width$}  {:12}  {:8}  {}",
                field.id,
                field.tag.as_str(),
                required,
                field.description,
            );
        }
    }
}

/// Handle the generate command
fn handle_generate_command(
    registry: &SchemaRegistry,
    variant: Variant,
    matches: &ArgMatches,
) -> Result<()> {
    let output = matches
        .get_one::<String>("output")
        .expect("output is required");
    let mut form = FormState::for_schema(registry);
    apply_sets(registry, &mut form, matches)?;

    let report = document::write(output, registry, &form, variant)?;
    print_write_report(output, &report);
    Ok(())
}

/// Handle the load command
fn handle_load_command(
    registry: &SchemaRegistry,
    variant: Variant,
    matches: &ArgMatches,
) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .expect("input is required");
    let report = document::read(input, registry, variant)?;
    print_load_report(registry, &report);

    if let Some(output) = matches.get_one::<String>("output") {
        let mut form = FormState::for_schema(registry);
        form.apply(&report);
        apply_sets(registry, &mut form, matches)?;
        let written = document::write(output, registry, &form, variant)?;
        print_write_report(output, &written);
    }
    Ok(())
}

fn print_write_report(output: &str, report: &WriteReport) {
    println!(
        "Wrote {} field(s) to '{}'.",
        report.written.len(),
        output
    );
    for skipped in &report.skipped {
        eprintln!("Skipped '{}': {}", skipped.field, skipped.error);
    }
    for id in &report.required_omitted {
        eprintln!("Required field '{}' is not in the document", id);
    }
}

fn print_load_report(registry: &SchemaRegistry, report: &LoadReport) {
    for (category, fields) in registry.categories() {
        let loaded: Vec<(&FieldDescriptor, &String)> = fields
            .iter()
            .filter_map(|field| report.values.get(&field.id).map(|text| (field, text)))
            .collect();
        if loaded.is_empty() {
            continue;
        }
        println!("{}", category);
        for (field, text) in loaded {
            print_field(field, text);
        }
    }
    for rejected in &report.rejected {
        eprintln!("Not loaded '{}': {}", rejected.field, rejected.error);
    }
    for id in &report.ignored {
        eprintln!("Ignored unknown field '{}'", id);
    }
}

fn print_field(field: &FieldDescriptor, text: &str) {
    if field.tag.is_multiline() || text.contains('\n') {
        println!("  {} ({}):", field.id, field.tag);
        for line in text.lines() {
            println!("    {}", line);
        }
    } else {
        println!("  {} ({}): {}", field.id, field.tag, text);
    }
}
