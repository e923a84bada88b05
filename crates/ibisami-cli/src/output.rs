//! Result output formatting.

use crate::OutputFormat;
use anyhow::Result;
use lib_ibis::{AmiFile, Diagnostics, IbisFile, ParamNode, ParamTree};
use lib_types::AmiInitializer;
use serde::Serialize;
use std::io::Write;

/// Print a parsed AMI file.
pub fn print_ami(ami: &AmiFile, format: OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        return print_json(ami);
    }

    let mut out = std::io::stdout().lock();
    writeln!(out, "AMI File: {}", ami.root_name)?;
    if !ami.description.is_empty() {
        writeln!(out, "Description: {}", ami.description)?;
    }
    for (section, tree) in ami.param_defs.iter() {
        if let ParamNode::Branch(tree) = tree {
            writeln!(out, "\n{section}:")?;
            write_tree(&mut out, tree, 1)?;
        }
    }
    write_diagnostics(&mut out, &ami.diagnostics)?;
    Ok(())
}

fn write_tree(out: &mut impl Write, tree: &ParamTree, depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);
    for (name, node) in tree.iter() {
        match node {
            ParamNode::Leaf(p) => {
                writeln!(
                    out,
                    "{indent}{name}: {} ({} {} {})",
                    p.value(),
                    p.usage(),
                    p.ptype(),
                    p.format()
                )?;
            }
            ParamNode::Branch(sub) => {
                writeln!(out, "{indent}{name}:")?;
                write_tree(out, sub, depth + 1)?;
            }
        }
    }
    Ok(())
}

/// Print a parsed IBIS file.
pub fn print_ibis(ibis: &IbisFile, format: OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        return print_json(ibis);
    }

    let mut out = std::io::stdout().lock();
    writeln!(out, "IBIS File: {}", ibis.file_name)?;
    if let Some(ver) = ibis.ibis_ver {
        writeln!(out, "Version: {ver}")?;
    }
    writeln!(out, "Source: {}", ibis.source)?;
    writeln!(out, "Components: {}", ibis.components.len())?;
    writeln!(out, "Models: {}", ibis.models.len())?;

    for component in ibis.components.values() {
        writeln!(out, "\n  Component: {}", component.name)?;
        writeln!(out, "    Manufacturer: {}", component.manufacturer)?;
        writeln!(out, "    Pins: {}", component.pins.len())?;
    }

    for (name, entries) in &ibis.model_selectors {
        writeln!(out, "\n  Model Selector: {name}")?;
        for entry in entries {
            writeln!(out, "    {}: {}", entry.model, entry.description)?;
        }
    }

    for model in ibis.models.values() {
        writeln!(out, "\n  Model: {}", model.name)?;
        writeln!(out, "    Type: {}", model.model_type)?;
        writeln!(out, "    Supply: {} V", model.supply().0)?;
        if let Some(z) = model.output_impedance() {
            writeln!(out, "    Zout: {:.2} ohms", z.0)?;
        }
        if let Some(z) = model.input_impedance() {
            writeln!(out, "    Zin: {:.2} ohms", z.0)?;
        }
        if let Some(rate) = model.slew_rate() {
            writeln!(out, "    Slew: {:.3} V/ns", rate.as_v_per_ns())?;
        }
        if let Some(algo) = &model.algorithmic_model {
            for exe in &algo.executables {
                writeln!(out, "    Executable: {} {}", exe.library, exe.ami_file)?;
            }
        }
    }

    write_diagnostics(&mut out, &ibis.diagnostics)?;
    Ok(())
}

/// Print the `AMI_Init` inputs.
pub fn print_init(init: &AmiInitializer, format: OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        return print_json(init);
    }

    let mut out = std::io::stdout().lock();
    writeln!(out, "AMI_parameters_in: {}", init.ami_params_in())?;
    writeln!(out, "Row size:          {}", init.init.row_size)?;
    writeln!(out, "Aggressors:        {}", init.init.num_aggressors)?;
    writeln!(out, "Sample interval:   {:.3} ps", init.init.sample_interval.as_ps())?;
    writeln!(out, "Bit time:          {:.3} ps", init.init.bit_time.as_ps())?;
    writeln!(out, "Samples per bit:   {}", init.init.samples_per_bit())?;
    Ok(())
}

fn write_diagnostics(out: &mut impl Write, diags: &Diagnostics) -> Result<()> {
    if !diags.is_empty() {
        writeln!(out, "\nDiagnostics:")?;
        write!(out, "{diags}")?;
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
