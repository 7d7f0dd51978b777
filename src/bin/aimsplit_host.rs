//=========================================================================
// aimsplit-host
//
// Opens a window, loads AimSplit into an in-process harness and toggles
// the aim mode on `F`. Plugin log lines are echoed to stderr.
//
//=========================================================================

use std::error::Error;

use aim_split::harness::platform::Platform;
use aim_split::harness::{HarnessBuilder, HarnessError, KeyBindings, PluginExports};

fn main() -> Result<(), Box<dyn Error>> {
    let builder = HarnessBuilder::new().with_console_echo(true);
    let (events, receiver) = builder.channel();

    let logic = builder.spawn(PluginExports::aim_split(), receiver);

    let platform = Platform::new(events, KeyBindings::with_defaults());
    let platform_result = platform.run().map_err(HarnessError::from);

    let summary = match logic.join() {
        Ok(result) => result?,
        Err(_) => return Err("harness thread panicked".into()),
    };
    platform_result?;

    eprintln!(
        "AimSplit host exited after {} frames and {} actions",
        summary.frames, summary.actions
    );
    Ok(())
}
