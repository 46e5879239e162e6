use clap::Parser;
use lc3_vm::emulator;
use std::error::Error;
use std::path::PathBuf;

/// Runs an LC-3 program image until it executes HALT or CTRL-C is pressed.
#[derive(Parser)]
#[command(name = "lc3-vm", version, about)]
struct Cli {
    /// Program image: big endian u16 words, the first one being the load address
    image: PathBuf,
    /// Start at the load address of the image instead of 0x3000
    #[arg(long)]
    start_at_origin: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut emu = emulator::from_program(&cli.image)?;
    if cli.start_at_origin {
        let origin = emu.origin();
        emu.registers_mut().set_pc(origin);
    }
    log::debug!(
        "Running {} from {:?}",
        cli.image.display(),
        emu.registers().pc()
    );
    emu.execute()?;
    Ok(())
}
