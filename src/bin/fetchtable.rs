use clap::Parser;
use fetchbound::{
    extract_fetch, extraction_overlay, save_kml, Coord, ExtractionConfig, FetchResult,
    InvalidInputError, RoiBoundary, DEFAULT_AZIMUTH_STEP, DEFAULT_TRANSECT_LENGTH,
};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
    fmt::{self, Display},
    path::PathBuf,
};

/*-------------------------------------------------------------------------------------------------
 *                                     Command Line Options
 *-----------------------------------------------------------------------------------------------*/

/// Derive the fetch distance for every azimuth around a tower from a region of interest polygon
/// and save them in a table with the columns Azimuth,Fetch.
#[derive(Debug, Parser)]
#[clap(bin_name = "fetchtable")]
#[clap(author, version, about)]
struct FetchTableOptions {
    /// Latitude of the tower in degrees.
    #[clap(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude of the tower in degrees.
    #[clap(long, allow_hyphen_values = true)]
    lon: f64,

    /// The path to a KML file with the region of interest polygon.
    ///
    /// If this is not specified, then the program will check for it in the "FETCH_ROI"
    /// environment variable.
    #[clap(short, long)]
    #[clap(env = "FETCH_ROI")]
    roi: PathBuf,

    /// The path of the table to create.
    #[clap(short, long)]
    output: PathBuf,

    /// Length of the transects in meters, must be long enough to cross the boundary.
    #[clap(short, long, default_value_t = DEFAULT_TRANSECT_LENGTH)]
    transect_length: f64,

    /// Spacing of the transects in degrees, must divide 360 evenly.
    #[clap(short, long, default_value_t = DEFAULT_AZIMUTH_STEP)]
    azimuth_step: f64,

    /// Optionally save a KML file with the transects and intersections for checking.
    #[clap(long)]
    overlay: Option<PathBuf>,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

impl Display for FetchTableOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "\n")?; // yes, two blank lines.
        writeln!(f, "          Tower: {:.6},{:.6}", self.lat, self.lon)?;
        writeln!(f, "            ROI: {}", self.roi.display())?;
        writeln!(f, "         Output: {}", self.output.display())?;
        writeln!(f, "Transect Length: {} m", self.transect_length)?;
        writeln!(f, "   Azimuth Step: {}\u{b0}", self.azimuth_step)?;
        if let Some(ref overlay) = self.overlay {
            writeln!(f, "        Overlay: {}", overlay.display())?;
        }
        writeln!(f, "\n")?; // yes, two blank lines.

        Ok(())
    }
}

/// Check the command line arguments, and print them if verbose.
fn check_args(opts: &FetchTableOptions) -> FetchResult<()> {
    if !Coord::new(opts.lat, opts.lon).is_valid() {
        return Err(InvalidInputError {
            msg: format!("invalid tower location: {},{}", opts.lat, opts.lon),
        }
        .into());
    }

    if opts.verbose {
        info!(target:"startup", "{}", opts);
    }

    Ok(())
}

/*-------------------------------------------------------------------------------------------------
 *                                             Main
 *-----------------------------------------------------------------------------------------------*/
fn main() -> FetchResult<()> {
    let opts = FetchTableOptions::parse();
    let level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .with_module_level("fetchbound", level)
        .with_module_level("fetchtable", level)
        .init()?;

    check_args(&opts)?;

    let tower = Coord::new(opts.lat, opts.lon);
    let roi = RoiBoundary::from_kml(&opts.roi)?;

    let config = ExtractionConfig {
        azimuth_step: opts.azimuth_step,
        transect_length: opts.transect_length,
    };

    let extraction = extract_fetch(tower, &roi, config)?;
    extraction.table.save_csv(&opts.output)?;

    if let Some(ref overlay) = opts.overlay {
        save_kml(overlay, &extraction_overlay(tower, &roi, &extraction))?;
        info!("wrote overlay to {}", overlay.display());
    }

    let (min, max) = extraction
        .table
        .rows()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), row| {
            (min.min(row.fetch), max.max(row.fetch))
        });

    info!("");
    info!("Fetch summary:");
    info!("    azimuths - {:>12}", extraction.table.len());
    info!(" min fetch m - {:>12.1}", min);
    info!(" max fetch m - {:>12.1}", max);
    info!("");

    Ok(())
}
