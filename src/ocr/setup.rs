use anyhow::{anyhow, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::log;
use crate::paths::get_tesseract_dir;

const TESSDATA_REPO: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";
const ENG_TRAINEDDATA: &str = "eng.traineddata";

#[cfg(windows)]
const TESSERACT_EXE: &str = "tesseract.exe";
#[cfg(not(windows))]
const TESSERACT_EXE: &str = "tesseract";

#[cfg(windows)]
const COMMON_INSTALL_DIRS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR",
    r"C:\Program Files (x86)\Tesseract-OCR",
];
#[cfg(not(windows))]
const COMMON_INSTALL_DIRS: &[&str] = &["/usr/bin", "/usr/local/bin", "/opt/homebrew/bin"];

#[cfg(windows)]
const SYSTEM_TESSDATA_DIRS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
];
#[cfg(not(windows))]
const SYSTEM_TESSDATA_DIRS: &[&str] = &[
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
];

/// Resolved Tesseract installation.
#[derive(Clone, Debug)]
pub struct TesseractPaths {
    pub executable: PathBuf,
    /// `None` lets Tesseract use its compiled-in data path
    pub tessdata: Option<PathBuf>,
}

fn responds_to_version(exe: &Path) -> bool {
    Command::new(exe)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Finds the Tesseract executable: explicit override, our local dir, PATH,
/// then common install locations.
pub fn find_tesseract_executable(override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(anyhow!(
            "Configured tesseract path does not exist: {}",
            path.display()
        ));
    }

    let local_exe = get_tesseract_dir().join(TESSERACT_EXE);
    if local_exe.exists() {
        return Ok(local_exe);
    }

    let on_path = PathBuf::from("tesseract");
    if responds_to_version(&on_path) {
        return Ok(on_path);
    }

    for dir in COMMON_INSTALL_DIRS {
        let p = Path::new(dir).join(TESSERACT_EXE);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!(
        "Tesseract not found. Install Tesseract-OCR and add it to PATH, \
         or set ocr.tesseract_path in config.json."
    ))
}

/// Finds a tessdata directory containing `eng.traineddata`.
pub fn find_tessdata_dir() -> Option<PathBuf> {
    let local_tessdata = get_tesseract_dir().join("tessdata");
    if local_tessdata.join(ENG_TRAINEDDATA).exists() {
        return Some(local_tessdata);
    }

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let p = PathBuf::from(&prefix);
        if p.join(ENG_TRAINEDDATA).exists() {
            return Some(p);
        }
        let p = p.join("tessdata");
        if p.join(ENG_TRAINEDDATA).exists() {
            return Some(p);
        }
    }

    SYSTEM_TESSDATA_DIRS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.join(ENG_TRAINEDDATA).exists())
}

/// Ensures Tesseract is usable, downloading `eng.traineddata` into the local
/// tessdata directory if no installed copy is found.
pub fn ensure_tesseract(override_path: Option<&Path>) -> Result<TesseractPaths> {
    let executable = find_tesseract_executable(override_path)?;
    log(&format!("Tesseract executable: {}", executable.display()));

    if let Some(tessdata) = find_tessdata_dir() {
        log(&format!("tessdata found at: {}", tessdata.display()));
        return Ok(TesseractPaths {
            executable,
            tessdata: Some(tessdata),
        });
    }

    let tessdata_dir = get_tesseract_dir().join("tessdata");
    fs::create_dir_all(&tessdata_dir)?;
    download_tessdata(&tessdata_dir)?;

    Ok(TesseractPaths {
        executable,
        tessdata: Some(tessdata_dir),
    })
}

/// Downloads English trained data
fn download_tessdata(tessdata_dir: &Path) -> Result<()> {
    let eng_url = format!("{}/{}", TESSDATA_REPO, ENG_TRAINEDDATA);
    let eng_path = tessdata_dir.join(ENG_TRAINEDDATA);

    log(&format!("Downloading {}...", ENG_TRAINEDDATA));

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(300))
        .build()?;

    let response = client
        .get(&eng_url)
        .header("User-Agent", "sekai-card-import")
        .send()?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to download {}: HTTP {}",
            ENG_TRAINEDDATA,
            response.status()
        ));
    }

    let bytes = response.bytes()?;
    let mut file = fs::File::create(&eng_path)?;
    file.write_all(&bytes)?;

    log(&format!("Downloaded {} ({} bytes)", ENG_TRAINEDDATA, bytes.len()));

    Ok(())
}
