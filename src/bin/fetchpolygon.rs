use clap::Parser;
use fetchbound::{
    reconstruct_geographic, reconstruction_overlay, save_kml, Coord, FetchResult, FetchVector,
    Hemisphere, InvalidInputError, RoiBoundary, UtmProjection, UtmZone,
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

/// Rebuild a fetch boundary polygon from fetch distances around a tower and save it in a KML
/// file, optionally along with the region of interest, for checking over satellite imagery.
#[derive(Debug, Parser)]
#[clap(bin_name = "fetchpolygon")]
#[clap(author, version, about)]
struct FetchPolygonOptions {
    /// Latitude of the tower in degrees.
    #[clap(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude of the tower in degrees.
    #[clap(long, allow_hyphen_values = true)]
    lon: f64,

    /// Comma separated fetch distances in meters, the first is due north and the rest are
    /// equally spaced clockwise around the circle.
    #[clap(short, long, value_delimiter = ',')]
    fetch: Option<Vec<f64>>,

    /// A table with the columns Azimuth,Fetch to read the distances from instead, such as the
    /// one produced by fetchtable.
    #[clap(short = 't', long)]
    fetch_table: Option<PathBuf>,

    /// The angular step in degrees used to draw each sector of the boundary.
    #[clap(short, long, default_value_t = 1.0)]
    step: f64,

    /// The UTM zone to build the polygon in, by default the zone containing the tower.
    #[clap(short, long)]
    zone: Option<u8>,

    /// Use the southern hemisphere version of --zone.
    #[clap(long)]
    south: bool,

    /// Optionally include a region of interest polygon from this KML file in the output.
    #[clap(short, long)]
    #[clap(env = "FETCH_ROI")]
    roi: Option<PathBuf>,

    /// The path of the KML file to create.
    #[clap(short, long)]
    output: PathBuf,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

impl Display for FetchPolygonOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "\n")?; // yes, two blank lines.
        writeln!(f, "      Tower: {:.6},{:.6}", self.lat, self.lon)?;
        if let Some(ref fetch) = self.fetch {
            writeln!(f, "      Fetch: {:?}", fetch)?;
        }
        if let Some(ref table) = self.fetch_table {
            writeln!(f, "Fetch Table: {}", table.display())?;
        }
        writeln!(f, "       Step: {}\u{b0}", self.step)?;
        if let Some(ref roi) = self.roi {
            writeln!(f, "        ROI: {}", roi.display())?;
        }
        writeln!(f, "     Output: {}", self.output.display())?;
        writeln!(f, "\n")?; // yes, two blank lines.

        Ok(())
    }
}

/// Check the command line arguments, and print them if verbose.
fn check_args(opts: &FetchPolygonOptions) -> FetchResult<()> {
    if !Coord::new(opts.lat, opts.lon).is_valid() {
        return Err(InvalidInputError {
            msg: format!("invalid tower location: {},{}", opts.lat, opts.lon),
        }
        .into());
    }

    if opts.fetch.is_some() == opts.fetch_table.is_some() {
        return Err(InvalidInputError {
            msg: "exactly one of --fetch or --fetch-table is required".to_owned(),
        }
        .into());
    }

    if opts.south && opts.zone.is_none() {
        return Err(InvalidInputError {
            msg: "--south only applies with --zone".to_owned(),
        }
        .into());
    }

    if opts.verbose {
        info!(target:"startup", "{}", opts);
    }

    Ok(())
}

fn load_fetch(opts: &FetchPolygonOptions) -> FetchResult<FetchVector> {
    match (&opts.fetch, &opts.fetch_table) {
        (Some(fetch), None) => Ok(FetchVector::new(fetch.clone())?),
        (None, Some(table)) => FetchVector::from_csv(table),
        _ => Err(InvalidInputError {
            msg: "exactly one of --fetch or --fetch-table is required".to_owned(),
        }
        .into()),
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                             Main
 *-----------------------------------------------------------------------------------------------*/
fn main() -> FetchResult<()> {
    let opts = FetchPolygonOptions::parse();
    let level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .with_module_level("fetchbound", level)
        .with_module_level("fetchpolygon", level)
        .init()?;

    check_args(&opts)?;

    let tower = Coord::new(opts.lat, opts.lon);
    let fetch = load_fetch(&opts)?;

    let zone = match opts.zone {
        Some(number) => {
            let hemisphere = if opts.south {
                Hemisphere::South
            } else {
                Hemisphere::North
            };
            UtmZone::new(number, hemisphere)?
        }
        None => UtmZone::containing(tower),
    };
    info!("building polygon in UTM zone {}", zone);

    let projection = UtmProjection::new(zone)?;
    let reconstruction = reconstruct_geographic(tower, &fetch, opts.step, &projection)?;

    let roi = match opts.roi {
        Some(ref pth) => Some(RoiBoundary::from_kml(pth)?),
        None => None,
    };

    let overlay = reconstruction_overlay(tower, &reconstruction, roi.as_ref());
    save_kml(&opts.output, &overlay)?;
    info!("wrote boundary to {}", opts.output.display());

    Ok(())
}
