use std::error::Error;
use std::fs::File;
use std::path::Path;

use clap::Parser;
use env_logger::Env;
use log::{error, warn};

mod cli;
use crate::cli::Cli;
use crate::cli::Commands;
use crate::cli::Config;

mod artifact;
mod buf;
mod registry;
mod riff;
mod session;

use crate::buf::fill_buf;
use crate::registry::SessionRegistry;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // Parse the cli
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match &cli.command {
        Commands::Capture { chunk_size, file } => {
            let config = Config::load(cli.config.as_ref())?;
            std::fs::create_dir_all(&config.spool_dir)?;
            std::fs::create_dir_all(&config.save_dir)?;

            let registry = SessionRegistry::new(config);
            replay(&registry, file, *chunk_size)?;
        }
        Commands::Fix { src, dst } => match artifact::fix_wav_length(src, dst)? {
            Some(len) => println!("{}: {} payload bytes", dst.display(), len),
            None => println!("{}: no payload, nothing written", src.display()),
        },
        Commands::Inspect { file } => {
            let hdr = artifact::read_header(file)?;
            println!("{}:", file.display());
            println!("\tchannels:        {}", hdr.num_channels);
            println!("\tsampling rate:   {}", hdr.sampling_rate);
            println!("\tbits per sample: {}", hdr.bits_per_sample);
            println!("\tpayload offset:  {}", hdr.payload_offset);
            println!("\tpayload length:  {}", hdr.payload_length);
        }
    }
    Ok(())
}

// Stand in for the transport: feed a file through a session in fixed size
// chunks, in order, then stop it
fn replay(registry: &SessionRegistry, file: &Path, chunk_size: usize) -> Result<(), Box<dyn Error>> {
    if chunk_size == 0 {
        return Err("chunk size must be positive".into());
    }

    let id = registry.open();
    println!("SESSION: {}", id);

    let mut input = File::open(file)?;
    let mut in_buf = vec![0u8; chunk_size];

    loop {
        let (eof, len) = fill_buf(&mut input, &mut in_buf)?;
        if len > 0 {
            // A failed chunk ends the stream, what made it to disk still gets framed
            if let Err(e) = registry.ingest(&id, &in_buf[..len]) {
                warn!("{}: stream aborted: {}", id, e);
                break;
            }
        }
        if eof {
            break;
        }
    }

    if let Some(status) = registry.status(&id) {
        println!("\t{}: {:?}", status.id, status.state);
        println!("\tspool:    {}", status.spool_path.display());
        println!("\treceived: {} payload bytes", status.total_payload_bytes);
        println!("\topened:   {}", status.opened_at);
    }
    println!("{}", registry.stop(&id));
    Ok(())
}
