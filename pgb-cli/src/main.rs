mod config;

use anyhow::Context;
use clap::Parser;
use config::AppConfig;
use env_logger::Env;
use pgb_core::{
    Cartridge, ColorScheme, CoreConfig, EmulationState, FrameBuffer, FrameSink, SaveDataError,
    SCREEN_HEIGHT, SCREEN_WIDTH,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

// 154 lines of 456 cycles
const CYCLES_PER_FRAME: u32 = 70224;

#[derive(Parser)]
struct Cli {
    #[arg(short = 'f', long = "gb-file-path")]
    gb_file_path: PathBuf,
    /// TOML config file; command line flags take precedence over it
    #[arg(short = 'c', long = "config")]
    config_path: Option<PathBuf>,
    #[arg(long)]
    boot_rom_path: Option<PathBuf>,
    #[arg(long)]
    color_scheme: Option<ColorScheme>,
    /// Number of frames to run for
    #[arg(short = 'n', long)]
    frames: Option<u32>,
    /// Write the last completed frame to this path as a binary PPM image
    #[arg(long)]
    screenshot: Option<PathBuf>,
    /// Load the save state next to the ROM file before running
    #[arg(long)]
    load_state: bool,
    /// Write a save state next to the ROM file after running
    #[arg(long)]
    save_state: bool,
}

struct LastFrameSink {
    frames: u64,
    last_frame: Box<FrameBuffer>,
}

impl LastFrameSink {
    fn new() -> Self {
        Self {
            frames: 0,
            last_frame: Box::new([[0; SCREEN_WIDTH]; SCREEN_HEIGHT]),
        }
    }
}

impl FrameSink for LastFrameSink {
    fn present(&mut self, frame: &FrameBuffer) {
        self.frames += 1;
        *self.last_frame = *frame;
    }
}

fn encode_ppm(frame: &FrameBuffer, color_scheme: ColorScheme) -> Vec<u8> {
    let mut ppm = format!("P6\n{SCREEN_WIDTH} {SCREEN_HEIGHT}\n255\n").into_bytes();
    for line in frame {
        for &shade in line {
            ppm.extend(color_scheme.rgb(shade));
        }
    }
    ppm
}

fn save_data_path(gb_file_path: &Path) -> PathBuf {
    gb_file_path.with_extension("sav")
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Cli::parse();

    let app_config = match &args.config_path {
        Some(config_path) => AppConfig::from_toml_file(config_path)?,
        None => AppConfig::default(),
    };
    log::debug!("Loaded app config: {app_config:?}");

    let boot_rom_path = args
        .boot_rom_path
        .clone()
        .or_else(|| app_config.boot_rom_path.as_ref().map(PathBuf::from));
    let boot_rom = boot_rom_path
        .map(|path| {
            fs::read(&path).with_context(|| format!("error reading boot ROM from '{path:?}'"))
        })
        .transpose()?;

    let core_config = CoreConfig {
        boot_rom,
        color_scheme: args.color_scheme.unwrap_or(app_config.color_scheme),
    };
    log::info!("Core config:\n{core_config}");

    let rom = fs::read(&args.gb_file_path)
        .with_context(|| format!("error reading ROM from '{:?}'", args.gb_file_path))?;
    let cartridge = Cartridge::new(rom)
        .with_context(|| format!("error loading cartridge from '{:?}'", args.gb_file_path))?;

    let mut emulation_state = EmulationState::new(cartridge, core_config);

    let save_data_path = save_data_path(&args.gb_file_path);
    if app_config.persist_save_data && save_data_path.exists() {
        let save_data = fs::read(&save_data_path)
            .with_context(|| format!("error reading save data from '{save_data_path:?}'"))?;
        match emulation_state.import_save_data(&save_data) {
            Ok(()) => log::info!("Loaded save data from '{}'", save_data_path.display()),
            Err(err) => log::warn!("Ignoring save data at '{}': {err}", save_data_path.display()),
        }
    }

    let save_state_path = pgb_core::determine_save_state_path(&args.gb_file_path);
    if args.load_state {
        emulation_state
            .load_state(&save_state_path)
            .with_context(|| format!("error loading save state from '{save_state_path:?}'"))?;
    }

    let frames = args.frames.unwrap_or(app_config.frames);
    let mut sink = LastFrameSink::new();
    let mut stdout = std::io::stdout().lock();
    for _ in 0..frames {
        emulation_state.step(CYCLES_PER_FRAME, &mut sink);

        let serial_output = emulation_state.take_serial_output();
        if !serial_output.is_empty() {
            stdout
                .write_all(&serial_output)
                .and_then(|()| stdout.flush())
                .context("error writing serial output to stdout")?;
        }
    }
    log::info!(
        "Ran {} cycles, {} frames presented",
        emulation_state.clock().elapsed(),
        sink.frames
    );

    if let Some(screenshot_path) = &args.screenshot {
        let color_scheme = emulation_state.config().color_scheme;
        fs::write(screenshot_path, encode_ppm(&sink.last_frame, color_scheme))
            .with_context(|| format!("error writing screenshot to '{screenshot_path:?}'"))?;
        log::info!("Wrote screenshot to '{}'", screenshot_path.display());
    }

    if app_config.persist_save_data {
        match emulation_state.export_save_data() {
            Ok(save_data) => {
                fs::write(&save_data_path, save_data).with_context(|| {
                    format!("error writing save data to '{save_data_path:?}'")
                })?;
                log::info!("Wrote save data to '{}'", save_data_path.display());
            }
            Err(SaveDataError::NoRam | SaveDataError::NoBattery) => {}
            Err(err) => return Err(err.into()),
        }
    }

    if args.save_state {
        emulation_state
            .save_state(&save_state_path)
            .with_context(|| format!("error writing save state to '{save_state_path:?}'"))?;
    }

    Ok(())
}
