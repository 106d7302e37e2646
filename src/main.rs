use clap::Parser;
use drp_inventory::{InventoryLoader, InventoryError, Result, TerminalOutputHandler};
use drp_inventory::cli::parser::{CliParser, CliMode};
use drp_inventory::cli::show::{render_host, render_list, show_inventory};
use drp_inventory::util::io::quit;
use drp_inventory::util::yaml::show_yaml_error_in_context;
use std::sync::Arc;

fn main() {
    let cli_parser = CliParser::parse();
    match liftoff(&cli_parser) {
        Err(InventoryError::Yaml(e)) => {
            if let Ok(path) = cli_parser.inventory_path() {
                show_yaml_error_in_context(&e, &path);
            }
            quit(&format!("ERROR: {}", InventoryError::Yaml(e)));
        },
        Err(e) => quit(&format!("ERROR: {}", e)),
        _ => {}
    }
}

fn liftoff(cli_parser: &CliParser) -> Result<()> {
    let path = cli_parser.inventory_path().map_err(InventoryError::Config)?;
    let output_handler = Arc::new(TerminalOutputHandler::new(cli_parser.verbosity as u32));

    let result = InventoryLoader::new(path)
        .with_output_handler(output_handler)
        .load()?;

    match cli_parser.mode() {
        CliMode::List => {
            println!("{}", render_list(&result.inventory, cli_parser.yaml, cli_parser.pretty)?);
        },
        CliMode::Host(name) => {
            println!("{}", render_host(&result.inventory, &name, cli_parser.yaml, cli_parser.pretty)?);
        },
        CliMode::Show => {
            show_inventory(&result.inventory);
        },
    }
    Ok(())
}
