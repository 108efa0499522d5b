use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fs_err as fs;
use log::info;

use crate::{album_ref::AlbumReference, imgur_api::ImageDescriptor, options::Global};

use super::connect;

#[derive(Debug, Args)]
pub struct ListOptions {
    /// The album or image URL to list.
    pub url: AlbumReference,

    /// A path to a file to put the list in. Printed to stdout if not given.
    #[clap(long = "output")]
    pub output: Option<PathBuf>,

    /// Write every image's full description as JSON instead of one link per
    /// line.
    #[clap(long)]
    pub json: bool,
}

pub fn list(global: Global, options: ListOptions) -> Result<()> {
    let client = connect(&global)?;

    let images = client.images_for(&options.url)?;
    info!("{} has {} image(s)", options.url, images.len());

    match &options.output {
        Some(path) => {
            let mut file = BufWriter::new(fs::File::create(path)?);
            write_list(&mut file, &images, options.json)?;
            file.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_list(&mut handle, &images, options.json)?;
            handle.flush()?;
        }
    }

    Ok(())
}

fn write_list<W: Write>(output: &mut W, images: &[ImageDescriptor], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *output, images)?;
        writeln!(output)?;
    } else {
        for image in images {
            writeln!(output, "{}", image.link)?;
        }
    }

    Ok(())
}
