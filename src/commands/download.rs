use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use log::info;
use resolve_path::PathResolveExt;

use crate::{
    downloader::{check_filename_base, DownloadError, Downloader},
    fetcher::HttpFetcher,
    options::Global,
};

use super::connect;

#[derive(Debug, Args)]
pub struct DownloadOptions {
    /// The album or image URLs to download, like https://imgur.com/a/<id> or
    /// https://i.imgur.com/<id>.jpg. They are downloaded in order.
    #[clap(required(true))]
    pub urls: Vec<String>,

    /// The name of the directory to download into, also used as the start of
    /// every file name: <name>-<index>.<extension>.
    #[clap(long, value_parser(clap::builder::ValueParser::new(parse_name)))]
    pub name: String,

    /// The directory that the <name> directory is created in.
    #[clap(long = "output-root", default_value = "../data")]
    pub output_root: PathBuf,
}

fn parse_name(name: &str) -> Result<String, DownloadError> {
    check_filename_base(name)?;
    Ok(name.to_owned())
}

pub fn download(global: Global, options: DownloadOptions) -> Result<()> {
    let client = connect(&global)?;
    let fetcher = HttpFetcher::new()?;

    let output_root = options.output_root.try_resolve()?.to_path_buf();
    let downloader = Downloader::new(&*client, &fetcher, output_root).with_progress_bar();

    for url in &options.urls {
        let report = downloader.download(url, &options.name)?;

        info!(
            "Saved {} image(s) from {} to {}",
            report.written.len(),
            report.reference,
            report.target.destination.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use clap::Parser;

    use crate::commands::Command;
    use crate::options::Options;

    fn parse(args: &[&str]) -> Result<Options, clap::Error> {
        Options::try_parse_from(["imgur-dl", "download"].iter().chain(args))
    }

    #[test]
    fn accepts_plain_name() {
        let options = parse(&["https://imgur.com/a/XYZ123", "--name", "lis-giolito"]).unwrap();

        match options.command {
            Command::Download(download) => {
                assert_eq!(download.name, "lis-giolito");
                assert_eq!(download.urls, vec!["https://imgur.com/a/XYZ123"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn rejects_names_that_are_paths() {
        for name in ["", "..", "/tmp/victim", "nested/name"] {
            assert!(
                parse(&["https://imgur.com/a/XYZ123", "--name", name]).is_err(),
                "{:?} should be rejected",
                name
            );
        }
    }
}
