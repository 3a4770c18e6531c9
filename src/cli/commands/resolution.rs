//! Resolution command.

use crate::cli::ResolutionArgs;
use anyhow::Result;
use chart_controller::resolution_for;
use chart_core::types::Window;

/// Print the resolution and sample count for a window.
pub async fn run(args: ResolutionArgs) -> Result<()> {
    let window = Window::new(args.start, args.end)?;

    println!("Window:     {}", window);
    println!("Span:       {}s", window.end - window.start);
    println!("Resolution: {}", resolution_for(window.start, window.end));
    println!("Samples:    {}", window.slot_count());

    Ok(())
}
