//! Command execution.

use std::fs;
use std::io::{self, Write};

use drivefs_http::{CacheMode, DownloadOptions, Downloaded, Downloader, LocalOutput};
use drivefs_tree_store::{PathReader, PathWriter, PermissionRole, PermissionType, Record};

use crate::args::{Args, Command};

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Store(#[from] drivefs_tree_store::Error),

    #[error("{0}")]
    Http(#[from] drivefs_http::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("no folder given (use --folder or DRIVEFS_FOLDER)")]
    MissingFolder,
}

/// Execute the parsed command line, writing results to `out`.
pub fn run(args: &Args, out: &mut impl Write) -> Result<(), CliError> {
    tracing::debug!(command = ?args.command, "running");
    match &args.command {
        Command::Get {
            url,
            out: target,
            temp,
            cache,
        } => {
            let options = DownloadOptions {
                local: match (target, temp) {
                    (Some(path), _) => LocalOutput::Path(path.clone()),
                    (None, true) => LocalOutput::Temp,
                    (None, false) => LocalOutput::None,
                },
                cache: match cache {
                    None => CacheMode::Disabled,
                    Some(None) => CacheMode::Default,
                    Some(Some(dir)) => CacheMode::Dir(dir.clone()),
                },
            };
            download(&Downloader::new()?, url, &options, out)
        }
        Command::Ls => list(&mut drivefs_http::open_reader(&drive_config(args)?)?, out),
        Command::Cat { path } => {
            cat(&mut drivefs_http::open_reader(&drive_config(args)?)?, path, out)
        }
        Command::Share {
            path,
            permission_type,
            role,
        } => share(
            &mut drivefs_http::open_reader(&drive_config(args)?)?,
            path,
            *permission_type,
            *role,
            out,
        ),
        Command::Put { path, file } => {
            let content = fs::read(file)?;
            put(&mut drivefs_http::open_store(&drive_config(args)?)?, path, content)
        }
        Command::Rm { path } => {
            remove(&mut drivefs_http::open_store(&drive_config(args)?)?, path)
        }
    }
}

fn drive_config(args: &Args) -> Result<drivefs_http::DriveConfig, CliError> {
    args.drive_config().ok_or(CliError::MissingFolder)
}

/// Print every key, sorted.
pub fn list(reader: &mut impl PathReader, out: &mut impl Write) -> Result<(), CliError> {
    let mut keys: Vec<&str> = reader.keys()?.collect();
    keys.sort_unstable();
    for key in keys {
        writeln!(out, "{}", key)?;
    }
    Ok(())
}

/// Write the raw content at `path`.
pub fn cat(reader: &mut impl PathReader, path: &str, out: &mut impl Write) -> Result<(), CliError> {
    let content = reader.read(path)?;
    out.write_all(&content)?;
    Ok(())
}

pub fn share(
    reader: &mut impl PathReader,
    path: &str,
    permission_type: PermissionType,
    role: PermissionRole,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let url = reader.share_url(path, permission_type, role)?;
    writeln!(out, "{}", url)?;
    Ok(())
}

pub fn put(store: &mut impl PathWriter, path: &str, content: Vec<u8>) -> Result<(), CliError> {
    store.write(path, Record::from(content))?;
    Ok(())
}

pub fn remove(store: &mut impl PathWriter, path: &str) -> Result<(), CliError> {
    store.delete(path)?;
    Ok(())
}

pub fn download(
    downloader: &Downloader,
    url: &str,
    options: &DownloadOptions,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match downloader.get_bytes(url, options)? {
        Downloaded::File(path) => writeln!(out, "{}", path.display())?,
        // already on disk, nothing to print
        Downloaded::Bytes(_) if matches!(options.local, LocalOutput::Path(_)) => {}
        Downloaded::Bytes(content) => out.write_all(&content)?,
    }
    Ok(())
}
