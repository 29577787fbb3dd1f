use clap::Parser;
use fidmark::io::{add_suffix, load_gray_image, save_mask};
use fidmark::{
    CollapseConfig, CornerParams, CornerResponseKind, CropSize, FiducialSet, LocateConfig,
    MaskValues, OwnedImage, RegionCollection, RegionFilter, Side,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "fidmark CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
    /// Abandon the job if it has not finished after this many milliseconds.
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ResponseConfig {
    MinEigen,
    Harris,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CornerConfigJson {
    max_corners: usize,
    quality_level: f32,
    min_distance: f32,
    block_size: usize,
    response: ResponseConfig,
    harris_k: f32,
    subpixel: bool,
}

impl Default for CornerConfigJson {
    fn default() -> Self {
        let cfg = CornerParams::default();
        Self {
            max_corners: cfg.max_corners,
            quality_level: cfg.quality_level,
            min_distance: cfg.min_distance,
            block_size: cfg.block_size,
            response: ResponseConfig::MinEigen,
            harris_k: 0.04,
            subpixel: cfg.subpixel,
        }
    }
}

impl From<&CornerConfigJson> for CornerParams {
    fn from(value: &CornerConfigJson) -> Self {
        let response = match value.response {
            ResponseConfig::MinEigen => CornerResponseKind::MinEigen,
            ResponseConfig::Harris => CornerResponseKind::Harris { k: value.harris_k },
        };
        Self {
            max_corners: value.max_corners,
            quality_level: value.quality_level,
            min_distance: value.min_distance,
            block_size: value.block_size,
            response,
            subpixel: value.subpixel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FiducialConfigJson {
    enabled: bool,
    crop_height: usize,
    crop_width: usize,
    kernel_size: Option<usize>,
    iterations: usize,
    use_threshold: bool,
    block_size: usize,
    parallel: bool,
    corner: CornerConfigJson,
}

impl Default for FiducialConfigJson {
    fn default() -> Self {
        let cfg = LocateConfig::default();
        Self {
            enabled: true,
            crop_height: 200,
            crop_width: 200,
            kernel_size: cfg.kernel_size,
            iterations: cfg.iterations,
            use_threshold: cfg.use_threshold,
            block_size: cfg.block_size,
            parallel: cfg.parallel,
            corner: CornerConfigJson::default(),
        }
    }
}

impl FiducialConfigJson {
    fn crop_size(&self) -> CropSize {
        CropSize::new(self.crop_height, self.crop_width)
    }

    fn locate_config(&self) -> LocateConfig {
        LocateConfig {
            kernel_size: self.kernel_size,
            iterations: self.iterations,
            use_threshold: self.use_threshold,
            block_size: self.block_size,
            corner: CornerParams::from(&self.corner),
            parallel: self.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FilterConfigJson {
    min_area: Option<f64>,
    max_area: Option<f64>,
    min_edge_distance: Option<f64>,
    max_edge_distance: Option<f64>,
    min_ratio: Option<f64>,
    max_ratio: Option<f64>,
}

impl From<&FilterConfigJson> for RegionFilter {
    fn from(value: &FilterConfigJson) -> Self {
        let open = RegionFilter::default();
        Self {
            min_area: value.min_area.unwrap_or(open.min_area),
            max_area: value.max_area.unwrap_or(open.max_area),
            min_edge_distance: value.min_edge_distance.unwrap_or(open.min_edge_distance),
            max_edge_distance: value.max_edge_distance.unwrap_or(open.max_edge_distance),
            min_ratio: value.min_ratio.unwrap_or(open.min_ratio),
            max_ratio: value.max_ratio.unwrap_or(open.max_ratio),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CollapseConfigJson {
    enabled: bool,
    kernel_size: usize,
    iterations: usize,
}

impl Default for CollapseConfigJson {
    fn default() -> Self {
        let cfg = CollapseConfig::default();
        Self {
            enabled: false,
            kernel_size: cfg.kernel_size,
            iterations: cfg.iterations,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegionsConfigJson {
    /// Rings of `[x, y]` vertices.
    polygons: Vec<Vec<[f64; 2]>>,
    include_fiducial_regions: bool,
    border_width: Option<usize>,
    filter: Option<FilterConfigJson>,
    collapse: CollapseConfigJson,
    /// Mask path; defaults to the image path with a `_mask` suffix.
    mask_output_path: Option<String>,
    write_mask: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    output_path: Option<String>,
    fiducials: FiducialConfigJson,
    regions: Option<RegionsConfigJson>,
}

#[derive(Debug, Serialize)]
struct CornerRecord {
    side: &'static str,
    x: Option<f64>,
    y: Option<f64>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct RegionsRecord {
    count: usize,
    polygons: Vec<Vec<[f64; 2]>>,
    mask_path: Option<String>,
}

#[derive(Debug, Default, Serialize)]
struct Output {
    fiducials: Vec<CornerRecord>,
    regions: Option<RegionsRecord>,
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Top => "top",
        Side::Right => "right",
        Side::Bottom => "bottom",
        Side::Left => "left",
    }
}

fn locate_fiducials(
    image: &OwnedImage,
    config: &FiducialConfigJson,
) -> Result<Vec<CornerRecord>, Box<dyn std::error::Error>> {
    let mut set = FiducialSet::new(image.view());
    let coords = set.locate(config.crop_size(), &config.locate_config())?;

    Ok(Side::ALL
        .iter()
        .zip(coords)
        .map(|(&side, point)| CornerRecord {
            side: side_name(side),
            x: point.map(|p| p.x),
            y: point.map(|p| p.y),
            error: set
                .mark(side)
                .and_then(|mark| mark.error())
                .map(|err| err.to_string()),
        })
        .collect())
}

fn process_regions(
    image: &OwnedImage,
    image_path: &str,
    config: &RegionsConfigJson,
    crop: CropSize,
) -> Result<RegionsRecord, Box<dyn std::error::Error>> {
    let source = image.view();
    let rings = config
        .polygons
        .iter()
        .map(|ring| ring.iter().map(|&[x, y]| (x, y)));
    let mut regions = RegionCollection::from_coords(source, rings)?;
    if config.include_fiducial_regions {
        regions = regions.combine(&RegionCollection::fiducial_regions(source, crop)?)?;
    }
    if let Some(width) = config.border_width {
        regions = regions.combine(&RegionCollection::border_frame(source, width)?)?;
    }
    if let Some(filter) = &config.filter {
        regions.filter(&RegionFilter::from(filter))?;
    }
    if config.collapse.enabled {
        regions.collapse(&CollapseConfig {
            kernel_size: config.collapse.kernel_size,
            iterations: config.collapse.iterations,
        })?;
    }

    let mask_path = if config.write_mask || config.mask_output_path.is_some() {
        let path = match &config.mask_output_path {
            Some(path) => PathBuf::from(path),
            None => add_suffix(image_path, "_mask"),
        };
        save_mask(&regions, &path, MaskValues::default())?;
        Some(path.display().to_string())
    } else {
        None
    };

    Ok(RegionsRecord {
        count: regions.len(),
        polygons: regions
            .iter()
            .map(|polygon| polygon.points().iter().map(|p| [p.x, p.y]).collect())
            .collect(),
        mask_path,
    })
}

fn run(config: &Config) -> Result<Output, Box<dyn std::error::Error>> {
    let image = load_gray_image(&config.image_path)?;
    let mut output = Output::default();
    if config.fiducials.enabled {
        output.fiducials = locate_fiducials(&image, &config.fiducials)?;
    }
    if let Some(regions) = &config.regions {
        let crop = config.fiducials.crop_size();
        output.regions = Some(process_regions(&image, &config.image_path, regions, crop)?);
    }
    Ok(output)
}

fn run_with_deadline(
    config: Config,
    timeout: Option<Duration>,
) -> Result<Output, Box<dyn std::error::Error>> {
    let Some(timeout) = timeout else {
        return run(&config);
    };

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = run(&config).map_err(|err| err.to_string());
        let _ = tx.send(result);
    });
    match rx.recv_timeout(timeout) {
        Ok(result) => result.map_err(Into::into),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            Err(format!("job did not finish within {} ms", timeout.as_millis()).into())
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err("worker thread exited early".into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("fidmark=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }
    if config.fiducials.crop_height == 0 || config.fiducials.crop_width == 0 {
        return Err("crop_height and crop_width must be at least 1".into());
    }

    let output_path = config.output_path.clone();
    let output = run_with_deadline(config, cli.timeout_ms.map(Duration::from_millis))?;
    let json = serde_json::to_string_pretty(&output)?;

    match output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
