use auto_args::AutoArgs;

use icemac::params::ScriptParams;
use icemac::report::{warn, Report};
use icemac::script;

fn main() -> std::io::Result<()> {
    let params = ScriptParams::from_args();
    let mut report = Report::new(params.quiet);
    let dir = params.macro_dir();
    let prefix = params.prefix();
    let path = params.script();

    let listed = script::emit(&dir, &prefix, &params.executable(), &path)?;
    if listed.is_empty() {
        warn(&format!("no macros starting with {:?} in {:?}", prefix, dir));
    }
    report.wrote(&path, listed.len());
    report.finish();
    Ok(())
}
