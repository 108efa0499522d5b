//! The download pipeline: resolve a URL, list its images, then fetch and
//! write them one at a time.
//!
//! Files are named `<base>-<index>.<ext>` inside `<output root>/<base>`,
//! where the index continues from however many entries the directory
//! already had. The first error stops the run; anything written before it
//! stays on disk.

use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use fs_err as fs;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use thiserror::Error;

use crate::{
    album_ref::{self, AlbumReference},
    fetcher::{self, ImageFetcher},
    imgur_api::{ImageDescriptor, ImgurApiClient},
    resume,
};

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("'{name}' cannot be used as a name, it must be a single file name without path separators")]
    InvalidName { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Accepts only names that stay inside the directory they are joined onto:
/// one plain path component, no `..`, no root, no separators.
pub fn check_filename_base(name: &str) -> Result<(), DownloadError> {
    let mut components = Path::new(name).components();

    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part.to_str() == Some(name) => Ok(()),
        _ => Err(DownloadError::InvalidName {
            name: name.to_owned(),
        }),
    }
}

/// Where one run writes its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub destination: PathBuf,
    pub filename_base: String,
    pub start_index: usize,
}

impl DownloadTarget {
    /// Creates `<output_root>/<filename_base>` if needed and picks up the
    /// index numbering should continue from.
    pub fn prepare(output_root: &Path, filename_base: &str) -> Result<Self, DownloadError> {
        check_filename_base(filename_base)?;

        let destination = output_root.join(filename_base);
        let start_index = resume::prepare(&destination)?;

        Ok(Self {
            destination,
            filename_base: filename_base.to_owned(),
            start_index,
        })
    }

    /// Path of the image at 1-based `position` in this run.
    pub fn file_path(&self, position: usize, extension: &str) -> PathBuf {
        self.destination.join(format!(
            "{}-{}.{}",
            self.filename_base,
            self.start_index + position,
            extension
        ))
    }
}

#[derive(Debug)]
pub struct DownloadReport {
    pub reference: AlbumReference,
    pub target: DownloadTarget,
    pub written: Vec<PathBuf>,
}

pub struct Downloader<'a> {
    client: &'a dyn ImgurApiClient,
    fetcher: &'a dyn ImageFetcher,
    output_root: PathBuf,
    show_progress: bool,
}

impl<'a> Downloader<'a> {
    pub fn new(
        client: &'a dyn ImgurApiClient,
        fetcher: &'a dyn ImageFetcher,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            fetcher,
            output_root: output_root.into(),
            show_progress: false,
        }
    }

    /// Draws a progress bar on stderr while images are downloaded.
    pub fn with_progress_bar(mut self) -> Self {
        self.show_progress = true;
        self
    }

    pub fn download(&self, url: &str, filename_base: &str) -> Result<DownloadReport> {
        let reference = album_ref::resolve(url)?;
        info!("Downloading {} as '{}'", reference, filename_base);

        let target = DownloadTarget::prepare(&self.output_root, filename_base)?;
        debug!(
            "writing to {}, numbering from {}",
            target.destination.display(),
            target.start_index + 1
        );

        let images = self.client.images_for(&reference)?;

        let progress = if self.show_progress {
            create_progress_bar(images.len() as u64, &reference)?
        } else {
            ProgressBar::hidden()
        };

        let result = self.download_images(&images, &target, &progress);
        progress.finish_and_clear();

        Ok(DownloadReport {
            reference,
            target,
            written: result?,
        })
    }

    fn download_images(
        &self,
        images: &[ImageDescriptor],
        target: &DownloadTarget,
        progress: &ProgressBar,
    ) -> Result<Vec<PathBuf>> {
        let total = images.len();
        let mut written = Vec::with_capacity(total);

        for (position, image) in (1..).zip(images) {
            let path = target.file_path(position, &fetcher::extension(image));
            let contents = self.fetcher.fetch_bytes(&image.link)?;
            fs::write(&path, contents)?;

            debug!("[{}/{}] {}", position, total, path.display());
            progress.inc(1);
            written.push(path);
        }

        Ok(written)
    }
}

fn create_progress_bar(total: u64, reference: &AlbumReference) -> Result<ProgressBar> {
    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    progress.set_message(reference.to_string());

    Ok(progress)
}
