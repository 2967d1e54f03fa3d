use auto_args::AutoArgs;

use icemac::layout;
use icemac::params::{save_sweep, GenerateParams, DEFAULT_EXECUTABLE};
use icemac::report::Report;
use icemac::script;

fn main() -> std::io::Result<()> {
    let params = GenerateParams::from_args();
    let mut report = Report::new(params.quiet);
    let sweep = params.sweep()?;
    let dir = params.output_dir();

    let mut written = Vec::new();
    layout::generate(&sweep, &dir, |path, m| {
        report.wrote(path, m.commands.len());
        written.push(m.name.clone());
    })?;

    if let Some(ref save_as) = params.save_sweep_as {
        save_sweep(&sweep, save_as)?;
        if !report.quiet {
            println!("Saved sweep to {:?}", save_as);
        }
    }
    if let Some(ref run_script) = params.run_script {
        let executable = params
            .executable
            .clone()
            .unwrap_or_else(|| DEFAULT_EXECUTABLE.to_string());
        script::write_script(&dir, &written, &executable, run_script)?;
        if !report.quiet {
            println!("Listed {} macros in {:?}", written.len(), run_script);
        }
    }
    report.finish();
    Ok(())
}
