//! Command-line interface for wsdl

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use std::sync::Arc;

#[cfg(feature = "cli")]
use wsdl::model::{Definition, ExtensibilityElement};
#[cfg(feature = "cli")]
use wsdl::{ExtensionRegistry, WsdlReader, WsdlWriter};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "wsdl")]
#[command(author, version, about = "WSDL 1.1 reading and writing tool", long_about = None)]
struct Cli {
    /// Log filter, e.g. `debug` or `wsdl=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Read a description and print it back in canonical form
    Roundtrip {
        /// Path to the WSDL file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not follow imports
        #[arg(long)]
        no_imports: bool,
    },

    /// Summarize the services, bindings and port types of a description
    Inspect {
        /// Path to the WSDL file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref());

    let result = match cli.command {
        Commands::Roundtrip {
            file,
            output,
            no_imports,
        } => cmd_roundtrip(file, output, no_imports),
        Commands::Inspect { file, json } => cmd_inspect(file, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_tracing(filter: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn read(file: &Path, import_documents: bool) -> Result<Definition, Box<dyn std::error::Error>> {
    let mut reader =
        WsdlReader::new().with_extension_registry(Arc::new(ExtensionRegistry::populated()));
    reader.set_feature(wsdl::reader::FEATURE_IMPORT_DOCUMENTS, import_documents)?;
    Ok(reader.read_wsdl(&file.to_string_lossy())?)
}

#[cfg(feature = "cli")]
fn cmd_roundtrip(
    file: PathBuf,
    output: Option<PathBuf>,
    no_imports: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let definition = read(&file, !no_imports)?;
    let xml = WsdlWriter::new().to_xml_string(&definition)?;

    if let Some(output_path) = output {
        fs::write(output_path, &xml)?;
    } else {
        print!("{}", xml);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_inspect(file: PathBuf, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let definition = read(&file, true)?;
    if json_output {
        print_definition_json(&definition)?;
    } else {
        print_definition_summary(&definition);
    }
    Ok(())
}

/// Endpoint address of a port, whichever binding extension carries it
#[cfg(feature = "cli")]
fn port_address(extensions: &[ExtensibilityElement]) -> Option<&str> {
    extensions.iter().find_map(|ext| match ext {
        ExtensibilityElement::SoapAddress(a) => a.location_uri.as_deref(),
        ExtensibilityElement::HttpAddress(a) => a.location_uri.as_deref(),
        _ => None,
    })
}

#[cfg(feature = "cli")]
fn print_definition_summary(definition: &Definition) {
    println!("wsdl v{}", wsdl::VERSION);
    println!();
    println!("Definition:");
    match &definition.qname {
        Some(name) => println!("  Name: {}", name.local_name),
        None => println!("  Name: (none)"),
    }
    match &definition.target_namespace {
        Some(ns) => println!("  Target Namespace: {}", ns),
        None => println!("  Target Namespace: (none)"),
    }
    println!();
    println!("Statistics:");
    println!("  Imports: {}", definition.all_imports().count());
    println!("  Messages: {}", definition.messages().filter(|m| !m.undefined).count());
    println!("  Port Types: {}", definition.port_types().filter(|p| !p.undefined).count());
    println!("  Bindings: {}", definition.bindings().filter(|b| !b.undefined).count());
    println!("  Services: {}", definition.services().count());

    println!("\n=== Services ===");
    for service in definition.services() {
        println!("  {}", service.qname);
        for port in service.ports() {
            let binding = port
                .binding
                .as_ref()
                .map(|b| b.to_string())
                .unwrap_or_else(|| "(none)".to_string());
            match port_address(&port.extensibility_elements) {
                Some(address) => println!("    {} -> {} @ {}", port.name, binding, address),
                None => println!("    {} -> {}", port.name, binding),
            }
        }
    }

    println!("\n=== Port Types ===");
    for port_type in definition.port_types().filter(|p| !p.undefined) {
        println!("  {}", port_type.qname);
        for operation in port_type.operations().iter().filter(|o| !o.undefined) {
            let style = operation.style.map(|s| s.as_str()).unwrap_or("unknown");
            println!("    {} ({})", operation.name, style);
        }
    }

    let unresolved: Vec<_> = definition
        .port_types()
        .filter(|p| p.undefined)
        .map(|p| p.qname.to_string())
        .chain(definition.bindings().filter(|b| b.undefined).map(|b| b.qname.to_string()))
        .chain(definition.messages().filter(|m| m.undefined).map(|m| m.qname.to_string()))
        .collect();
    if !unresolved.is_empty() {
        println!("\n=== Unresolved References ===");
        for name in unresolved {
            println!("  {}", name);
        }
    }
}

#[cfg(feature = "cli")]
fn print_definition_json(definition: &Definition) -> Result<(), Box<dyn std::error::Error>> {
    use serde_json::{json, Map, Value};

    let mut output = Map::new();
    output.insert(
        "name".to_string(),
        json!(definition.qname.as_ref().map(|q| q.local_name.clone())),
    );
    output.insert("targetNamespace".to_string(), json!(definition.target_namespace));

    let imports: Vec<Value> = definition
        .all_imports()
        .map(|import| {
            json!({
                "namespace": import.namespace_uri,
                "location": import.location_uri,
                "resolved": import.definition.is_some(),
            })
        })
        .collect();
    output.insert("imports".to_string(), Value::Array(imports));

    let messages: Vec<Value> = definition
        .messages()
        .map(|message| {
            json!({
                "name": message.qname.to_string(),
                "undefined": message.undefined,
                "parts": message.parts().map(|p| p.name.clone()).collect::<Vec<_>>(),
            })
        })
        .collect();
    output.insert("messages".to_string(), Value::Array(messages));

    let port_types: Vec<Value> = definition
        .port_types()
        .map(|port_type| {
            let operations: Vec<Value> = port_type
                .operations()
                .iter()
                .map(|op| {
                    json!({
                        "name": op.name,
                        "style": op.style.map(|s| s.as_str()),
                        "undefined": op.undefined,
                    })
                })
                .collect();
            json!({
                "name": port_type.qname.to_string(),
                "undefined": port_type.undefined,
                "operations": operations,
            })
        })
        .collect();
    output.insert("portTypes".to_string(), Value::Array(port_types));

    let bindings: Vec<Value> = definition
        .bindings()
        .map(|binding| {
            json!({
                "name": binding.qname.to_string(),
                "type": binding.port_type.as_ref().map(|t| t.to_string()),
                "undefined": binding.undefined,
                "operations": binding
                    .binding_operations()
                    .iter()
                    .map(|op| op.name.clone())
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    output.insert("bindings".to_string(), Value::Array(bindings));

    let services: Vec<Value> = definition
        .services()
        .map(|service| {
            let ports: Vec<Value> = service
                .ports()
                .map(|port| {
                    json!({
                        "name": port.name,
                        "binding": port.binding.as_ref().map(|b| b.to_string()),
                        "address": port_address(&port.extensibility_elements),
                    })
                })
                .collect();
            json!({
                "name": service.qname.to_string(),
                "ports": ports,
            })
        })
        .collect();
    output.insert("services".to_string(), Value::Array(services));

    println!("{}", serde_json::to_string_pretty(&Value::Object(output))?);
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
