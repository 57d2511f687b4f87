use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use imgcompare_core::io::transform::{flip_file, rotate_file, FlipDirection, Rotation};

#[derive(Args)]
#[command(group(ArgGroup::new("direction").required(true).args(["left", "right"])))]
pub struct RotateArgs {
    /// Image file to rewrite
    pub file: PathBuf,

    /// Rotate counter-clockwise
    #[arg(long)]
    pub left: bool,

    /// Rotate clockwise
    #[arg(long)]
    pub right: bool,
}

#[derive(Args)]
#[command(group(ArgGroup::new("axis").required(true).args(["horizontal", "vertical"])))]
pub struct FlipArgs {
    /// Image file to rewrite
    pub file: PathBuf,

    /// Mirror left to right
    #[arg(long)]
    pub horizontal: bool,

    /// Mirror top to bottom
    #[arg(long)]
    pub vertical: bool,
}

pub fn run_rotate(args: &RotateArgs) -> Result<()> {
    let rotation = if args.left {
        Rotation::Left
    } else {
        Rotation::Right
    };
    rotate_file(&args.file, rotation)
        .with_context(|| format!("Failed to rotate {}", args.file.display()))?;
    println!("Rotated {} {}", args.file.display(), rotation);
    Ok(())
}

pub fn run_flip(args: &FlipArgs) -> Result<()> {
    let direction = if args.horizontal {
        FlipDirection::Horizontal
    } else {
        FlipDirection::Vertical
    };
    flip_file(&args.file, direction)
        .with_context(|| format!("Failed to flip {}", args.file.display()))?;
    println!("Flipped {} {}", args.file.display(), direction);
    Ok(())
}
