/// Wet-bulb temperature above which a location is flagged dangerous (°C)
pub const DEFAULT_DANGER_THRESHOLD_C: f64 = 30.0;

/// Comparative band boundaries (°C)
pub const DEFAULT_CRITICAL_THRESHOLD_C: f64 = 32.0;
pub const DEFAULT_MAXIMUM_THRESHOLD_C: f64 = 35.0;

/// Literal used by the historical files for a missing cell
pub const DEFAULT_MISSING_MARKER: &str = "M";

/// Historical file columns
pub const STATION_COLUMN: &str = "station";
pub const VALID_COLUMN: &str = "valid";

/// File names
pub const DEFAULT_TEMPERATURE_FILE: &str = "temp.csv";
pub const DEFAULT_HUMIDITY_FILE: &str = "humid.csv";
pub const DEFAULT_DATASET_FILE: &str = "combined_with_wbt.csv";
pub const DEFAULT_CONFIG_FILE: &str = "wetbulb.toml";

/// Live weather service
pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org";
pub const WEATHER_ENDPOINT: &str = "/data/2.5/weather";
pub const DEFAULT_COUNTRY_CODE: &str = "IN";
pub const METRIC_UNITS: &str = "metric";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
pub const USER_AGENT: &str = concat!("wetbulb-monitor/", env!("CARGO_PKG_VERSION"));

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "WBT";

/// Display
pub const DEFAULT_DISPLAY_TIMEZONE: &str = "Asia/Kolkata";
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Processing defaults
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

/// Messages shown alongside a danger flag
pub const DANGER_ADVICE: &str = "can be deadly outside. Avoid direct sunlight and drink plenty of water.";
pub const SAFE_MESSAGE: &str = "Wet-bulb temperatures are within safe limits. Enjoy the weather responsibly and stay hydrated.";
pub const NO_DATA_MESSAGE: &str = "No data available. Please try again later.";
