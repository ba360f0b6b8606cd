//! Scene persistence: the textual, versioned project format.
//!
//! A project file is a Lua-table literal. The top level carries a version
//! number and a `world` table with the background color followed by five
//! sections in a fixed order: samplers, viewplane, materials, geometries,
//! lights. The order is load-bearing — later sections reference earlier
//! ones by zero-based insertion index into the corresponding `World`
//! collection, so both directions must process sections in exactly this
//! order for the indices to resolve.

mod loader;
mod value;
mod writer;

pub use loader::{load, load_from_str, LoadError, LoadResult};
pub use value::{Document, ParseError, ParseResult, Table, Value};
pub use writer::{save, save_to_string};

/// Version written to new files. Older/newer versions are accepted with a
/// warning; nothing has ever rejected a mismatch.
pub const FORMAT_VERSION: u32 = 1;

/// Field names of the project format. Fixed strings: renaming any of these
/// breaks every existing file.
pub(crate) mod names {
    pub const VERSION: &str = "project_version";

    pub const WORLD: &str = "world";
    pub const BACKGROUND_COLOR: &str = "background_color";
    pub const TYPE: &str = "type";

    pub const SAMPLERS: &str = "samplers";
    pub const NUM_SAMPLES: &str = "num_samples";

    pub const VIEWPLANE: &str = "viewplane";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const PIXEL_SIZE: &str = "pixelSize";
    pub const GAMMA: &str = "gamma";
    pub const MAX_DEPTH: &str = "max_depth";

    pub const MATERIALS: &str = "materials";
    pub const AMBIENT_KD: &str = "ambient_kd";
    pub const AMBIENT_CD: &str = "ambient_cd";
    pub const AMBIENT_SAMPLER_INDEX: &str = "ambient_sampler_index";
    pub const DIFFUSE_KD: &str = "diffuse_kd";
    pub const DIFFUSE_CD: &str = "diffuse_cd";
    pub const DIFFUSE_SAMPLER_INDEX: &str = "diffuse_sampler_index";
    pub const SPECULAR_KS: &str = "specular_ks";
    pub const SPECULAR_CS: &str = "specular_cs";
    pub const SPECULAR_EXP: &str = "specular_exp";
    // Historical spelling, kept for compatibility with existing files.
    pub const SPECULAR_SAMPLER_INDEX: &str = "specular_sampler_iindex";
    pub const RADIANCE_SCALE: &str = "radiance_scale";
    pub const EMISSIVE_CE: &str = "emissive_ce";

    pub const GEOMETRIES: &str = "geometries";
    pub const MATERIAL_INDEX: &str = "material_index";
    pub const POINT: &str = "point";
    pub const NORMAL: &str = "normal";
    pub const CENTER: &str = "center";
    pub const RADIUS: &str = "radius";
    pub const SIDE_A: &str = "side_a";
    pub const SIDE_B: &str = "side_b";

    pub const LIGHTS: &str = "lights";
    pub const CAST_SHADOWS: &str = "cast_shadows";
    pub const COLOR: &str = "color";
    pub const DIRECTION: &str = "direction";
    pub const LOCATION: &str = "location";
    pub const MIN_AMOUNT: &str = "min_amount";
    pub const SAMPLER_INDEX: &str = "sampler_index";
    pub const OBJECT_INDEX: &str = "object_index";
}
