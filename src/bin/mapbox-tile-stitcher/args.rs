use anyhow::{Context, Result};
use clap::{
    app_from_crate, crate_authors, crate_description, crate_name, crate_version,
    App, AppSettings, Arg, ArgMatches,
};
use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::validators::*;
use mapbox_tile_stitcher::{
    AccessToken, BoundingBox, Config, Fixture, ImageryKind, UrlFormat, DEFAULT_BASE_URL,
    DEFAULT_TEMPLATE,
};

const URL_ARG: &str = "url";
const BASE_URL_ARG: &str = "base_url";
const ZOOM_ARG: &str = "zoom";
const OUTPUT_DIR_ARG: &str = "output_dir";
const BBOX_FIXTURE_ARG: &str = "fixture";
const BBOX_NORTH_ARG: &str = "north";
const BBOX_SOUTH_ARG: &str = "south";
const BBOX_WEST_ARG: &str = "west";
const BBOX_EAST_ARG: &str = "east";
const TOKEN_ARG: &str = "token";
const TOKEN_FILE_ARG: &str = "token_file";
const KIND_ARG: &str = "kind";
const TIMEOUT_ARG: &str = "timeout";
const DRY_RUN_ARG: &str = "dry_run";
const RESUME_ARG: &str = "resume";
const COMPOSITE_ONLY_ARG: &str = "composite_only";
const LOG_LEVEL_ARG: &str = "log_level";

const TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

pub struct Args {
    pub bounding_box: BoundingBox,
    pub zoom: u8,
    pub token: Option<String>,
    pub token_file: PathBuf,
    pub output_dir: PathBuf,
    pub url: String,
    pub base_url: String,
    pub timeout: Duration,
    pub kinds: Vec<ImageryKind>,
    pub resume: bool,
    pub composite_only: bool,
    pub dry_run: bool,
    pub log_level: String,
}

impl TryFrom<Args> for Config {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> Result<Self> {
        let access_token = match args.token {
            Some(token) => AccessToken::new(token),
            None => AccessToken::from_file(&args.token_file).with_context(|| {
                format!(
                    "no --token or {} given and failed reading token file {}",
                    TOKEN_ENV,
                    args.token_file.display()
                )
            })?,
        };

        Ok(Self {
            bounding_box: args.bounding_box,
            zoom: args.zoom,
            access_token,
            output_folder: args.output_dir,
            url: UrlFormat::from_string(args.url).with_base(args.base_url),
            timeout: args.timeout,
            kinds: args.kinds,
            resume: args.resume,
        })
    }
}

impl Args {
    pub fn parse() -> Result<Self> {
        Self::from_matches(&app().get_matches())
    }

    pub fn from_matches(matches: &ArgMatches<'_>) -> Result<Self> {
        let bounding_box = match matches.value_of(BBOX_FIXTURE_ARG) {
            // if a fixture is specified, construct the bounding box from that
            Some(f) => f.parse::<Fixture>()?.bounding_box()?,
            // otherwise, parse the 4 coords separately
            None => BoundingBox::from_edges(
                value(matches, BBOX_NORTH_ARG)?,
                value(matches, BBOX_WEST_ARG)?,
                value(matches, BBOX_SOUTH_ARG)?,
                value(matches, BBOX_EAST_ARG)?,
            )?,
        };

        let kinds = match matches.values_of(KIND_ARG) {
            Some(values) => {
                let mut kinds = Vec::new();
                for v in values {
                    let kind = v.parse::<ImageryKind>()?;
                    if !kinds.contains(&kind) {
                        kinds.push(kind);
                    }
                }
                kinds
            }
            None => ImageryKind::ALL.to_vec(),
        };

        Ok(Self {
            bounding_box,
            zoom: value(matches, ZOOM_ARG)?,
            token: matches.value_of(TOKEN_ARG).map(str::to_owned),
            token_file: value(matches, TOKEN_FILE_ARG)?,
            output_dir: value(matches, OUTPUT_DIR_ARG)?,
            url: value(matches, URL_ARG)?,
            base_url: value(matches, BASE_URL_ARG)?,
            timeout: Duration::from_secs(value(matches, TIMEOUT_ARG)?),
            kinds,
            resume: matches.is_present(RESUME_ARG),
            composite_only: matches.is_present(COMPOSITE_ONLY_ARG),
            dry_run: matches.is_present(DRY_RUN_ARG),
            log_level: value(matches, LOG_LEVEL_ARG)?,
        })
    }
}

fn value<T>(matches: &ArgMatches<'_>, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    matches
        .value_of(name)
        .with_context(|| format!("missing value for `{}`", name))?
        .parse()
        .with_context(|| format!("invalid value for `{}`", name))
}

pub fn app() -> App<'static, 'static> {
    app_from_crate!()
        .setting(AppSettings::GlobalVersion)
        .setting(AppSettings::VersionlessSubcommands)
        .arg(
            Arg::with_name(BBOX_NORTH_ARG)
                .help("Latitude of the north (top-left) bounding box boundary (in degrees)")
                .required_unless(BBOX_FIXTURE_ARG)
                .validator(is_latitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .short("n")
                .long("north"),
        )
        .arg(
            Arg::with_name(BBOX_SOUTH_ARG)
                .help("Latitude of the south (bottom-right) bounding box boundary (in degrees)")
                .required_unless(BBOX_FIXTURE_ARG)
                .validator(is_latitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .short("s")
                .long("south"),
        )
        .arg(
            Arg::with_name(BBOX_EAST_ARG)
                .help("Longitude of the east (bottom-right) bounding box boundary (in degrees)")
                .required_unless(BBOX_FIXTURE_ARG)
                .validator(is_longitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .short("e")
                .long("east"),
        )
        .arg(
            Arg::with_name(BBOX_WEST_ARG)
                .help("Longitude of the west (top-left) bounding box boundary (in degrees)")
                .required_unless(BBOX_FIXTURE_ARG)
                .validator(is_longitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .short("w")
                .long("west"),
        )
        .arg(
            Arg::with_name(BBOX_FIXTURE_ARG)
                .help("Use a known, named bounding box (miami, miami-center)")
                .validator(is_bb_fixture)
                .conflicts_with_all(&[BBOX_NORTH_ARG, BBOX_SOUTH_ARG, BBOX_EAST_ARG, BBOX_WEST_ARG])
                .takes_value(true)
                .short("f")
                .long("fixture"),
        )
        .arg(
            Arg::with_name(ZOOM_ARG)
                .help("The web-Mercator zoom level to fetch")
                .validator(is_zoom)
                .default_value("13")
                .takes_value(true)
                .short("z")
                .long("zoom"),
        )
        .arg(
            Arg::with_name(TOKEN_ARG)
                .help("The tile server access token. Takes precedence over --token-file.")
                .env(TOKEN_ENV)
                .hide_env_values(true)
                .takes_value(true)
                .long("token"),
        )
        .arg(
            Arg::with_name(TOKEN_FILE_ARG)
                .help("File whose first line is the access token")
                .default_value("token")
                .takes_value(true)
                .long("token-file"),
        )
        .arg(
            Arg::with_name(KIND_ARG)
                .help("Imagery to process (satellite, elevation). May be repeated; defaults to both.")
                .validator(is_kind)
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .short("k")
                .long("kind"),
        )
        .arg(
            Arg::with_name(TIMEOUT_ARG)
                .help("The timeout (in seconds) for fetching a single tile. Pass 0 for no timeout.")
                .validator(is_numeric_min(0))
                .default_value("30")
                .takes_value(true)
                .short("t")
                .long("timeout"),
        )
        .arg(
            Arg::with_name(OUTPUT_DIR_ARG)
                .help("The folder to write tiles and composites to. Wiped before fetching unless --resume is given.")
                .default_value("data")
                .takes_value(true)
                .short("o")
                .long("output"),
        )
        .arg(
            Arg::with_name(URL_ARG)
                .help("The URL template with format specifiers `{base}`, `{tileset}`, `{z}`, `{x}`, `{y}`, `{scale}`, `{format}` and `{token}` to fetch the tiles from.")
                .default_value(DEFAULT_TEMPLATE)
                .takes_value(true)
                .short("u")
                .long("url"),
        )
        .arg(
            Arg::with_name(BASE_URL_ARG)
                .help("The value substituted for `{base}` in the URL template")
                .default_value(DEFAULT_BASE_URL)
                .takes_value(true)
                .long("base-url"),
        )
        .arg(
            Arg::with_name(RESUME_ARG)
                .help("Keep tiles from an earlier run and only fetch the missing ones")
                .takes_value(false)
                .long("resume"),
        )
        .arg(
            Arg::with_name(COMPOSITE_ONLY_ARG)
                .help("Don't fetch anything, just composite the tiles already in the output folder")
                .takes_value(false)
                .conflicts_with(RESUME_ARG)
                .long("composite-only"),
        )
        .arg(
            Arg::with_name(DRY_RUN_ARG)
                .help("Don't actually fetch anything, just determine how many tiles would be fetched.")
                .takes_value(false)
                .long("dry-run"),
        )
        .arg(
            Arg::with_name(LOG_LEVEL_ARG)
                .help("Log verbosity")
                .possible_values(&["error", "warn", "info", "debug", "trace"])
                .default_value("info")
                .takes_value(true)
                .long("log-level"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        let matches = app().get_matches_from_safe(
            std::iter::once("mapbox-tile-stitcher").chain(args.iter().copied()),
        )?;
        Args::from_matches(&matches)
    }

    #[test]
    fn corners_and_defaults() {
        let args = parse(&["-n", "25.93", "-w", "-80.40", "-s", "25.62", "-e", "-80.04"]).unwrap();

        assert_eq!(args.bounding_box, Fixture::Miami.bounding_box().unwrap());
        assert_eq!(args.zoom, 13);
        assert_eq!(args.kinds, ImageryKind::ALL.to_vec());
        assert_eq!(args.output_dir, PathBuf::from("data"));
        assert_eq!(args.timeout, Duration::from_secs(30));
        assert!(!args.resume && !args.dry_run && !args.composite_only);
    }

    #[test]
    fn fixture_and_single_kind() {
        let args = parse(&["--fixture", "miami", "-k", "elevation", "-k", "terrain", "-z", "12"]).unwrap();

        assert_eq!(args.kinds, vec![ImageryKind::Elevation]);
        assert_eq!(args.zoom, 12);
    }

    #[test]
    fn corners_required_without_fixture() {
        assert!(parse(&["-n", "25.93"]).is_err());
    }

    #[test]
    fn inverted_latitudes_are_rejected() {
        assert!(parse(&["-n", "25.62", "-w", "-80.40", "-s", "25.93", "-e", "-80.04"]).is_err());
    }

    #[test]
    fn explicit_token_wins() {
        let mut args = parse(&["-f", "miami", "--token-file", "/nonexistent/token"]).unwrap();
        args.token = Some("pk.inline".to_owned());
        let config = Config::try_from(args).unwrap();

        assert_eq!(config.access_token, AccessToken::new("pk.inline"));
        assert_eq!(config.kinds.len(), 2);
    }

    #[test]
    fn missing_token_file() {
        let mut args = parse(&["-f", "miami", "--token-file", "/nonexistent/token"]).unwrap();
        args.token = None;
        assert!(Config::try_from(args).is_err());
    }
}
