//! Project file loader.
//!
//! Sections are consumed in the same fixed order the writer emits them;
//! every index field is resolved against the collection populated by an
//! earlier section, with an explicit bounds check. The loader builds into a
//! scratch `World` and hands it back only when the whole file resolved, so
//! a failed load never leaves a half-populated scene behind — callers keep
//! their previous world and surface the error.

use std::fs;
use std::io;
use std::path::Path;

use glam::Vec3;
use thiserror::Error;

use super::names;
use super::value::{Document, ParseError, Table, Value};
use super::FORMAT_VERSION;
use crate::color::RgbColor;
use crate::geometry::{Geometry, Rectangle, Shape};
use crate::light::Light;
use crate::material::{Lambertian, Material, Specular};
use crate::sampler::{Sampler, SamplerKind};
use crate::world::{World, WorldError};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("missing `{section}` section")]
    MissingSection { section: &'static str },

    #[error("missing field `{name}` in {context}")]
    MissingField { context: &'static str, name: String },

    #[error("unknown {section} type tag \"{tag}\"")]
    UnknownTag { section: &'static str, tag: String },

    #[error("`{field}` = {index} does not resolve: {collection} has {len} entries")]
    BrokenReference {
        field: &'static str,
        collection: &'static str,
        index: usize,
        len: usize,
    },

    #[error("invalid value for `{name}`: {reason}")]
    InvalidValue { name: &'static str, reason: &'static str },

    #[error(transparent)]
    World(#[from] WorldError),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Load a project file into a fresh `World`.
pub fn load(path: impl AsRef<Path>) -> LoadResult<World> {
    let text = fs::read_to_string(path.as_ref())?;
    let world = load_from_str(&text)?;
    log::info!(
        "loaded {:?}: {} samplers, {} materials, {} geometries, {} lights",
        path.as_ref(),
        world.samplers().len(),
        world.materials().len(),
        world.objects().len(),
        world.lights().len(),
    );
    Ok(world)
}

/// Parse project-file text into a fresh `World`.
pub fn load_from_str(text: &str) -> LoadResult<World> {
    let doc = Document::parse(text)?;

    // The version is informational: historically nothing rejected a
    // mismatch, so keep accepting but make it visible.
    if let Some(version) = doc.number(names::VERSION) {
        if version as u32 != FORMAT_VERSION {
            log::warn!("project version {version} (supported: {FORMAT_VERSION}), loading anyway");
        }
    }

    let root = doc
        .table(names::WORLD)
        .ok_or(LoadError::MissingSection { section: names::WORLD })?;

    // Starting from an empty scratch world is what keeps the file's
    // zero-based indices aligned with collection positions.
    let mut world = World::new();
    world.background = color_field(root, "world", names::BACKGROUND_COLOR)?;

    load_samplers(root, &mut world)?;
    load_viewplane(root, &mut world)?;
    load_materials(root, &mut world)?;
    load_geometries(root, &mut world)?;
    load_lights(root, &mut world)?;

    world.validate()?;
    Ok(world)
}

fn load_samplers(root: &Table, world: &mut World) -> LoadResult<()> {
    for record in records(root, names::SAMPLERS)? {
        let tag = string_field(record, "sampler", names::TYPE)?;
        let kind = SamplerKind::from_str(tag)
            .ok_or_else(|| LoadError::UnknownTag { section: "sampler", tag: tag.to_string() })?;
        let num_samples = index_field(record, "sampler", names::NUM_SAMPLES)? as u32;
        if num_samples == 0 {
            return Err(LoadError::InvalidValue {
                name: names::NUM_SAMPLES,
                reason: "must be at least 1",
            });
        }
        world.add_sampler(Sampler::new(kind, num_samples));
    }
    Ok(())
}

fn load_viewplane(root: &Table, world: &mut World) -> LoadResult<()> {
    let record = root
        .table(names::VIEWPLANE)
        .ok_or(LoadError::MissingSection { section: names::VIEWPLANE })?;

    let width = number_field(record, "viewplane", names::WIDTH)? as i64;
    let height = number_field(record, "viewplane", names::HEIGHT)? as i64;
    if width < 1 || height < 1 {
        return Err(LoadError::InvalidValue { name: names::WIDTH, reason: "must be at least 1" });
    }

    let sampler_index = index_field(record, "viewplane", names::SAMPLER_INDEX)?;
    check_index(names::SAMPLER_INDEX, "samplers", sampler_index, world.samplers().len())?;

    let vp = &mut world.view_plane;
    vp.width = width as u32;
    vp.height = height as u32;
    vp.pixel_size = number_field(record, "viewplane", names::PIXEL_SIZE)? as f32;
    vp.gamma = number_field(record, "viewplane", names::GAMMA)? as f32;
    if vp.pixel_size <= 0.0 || vp.gamma <= 0.0 {
        return Err(LoadError::InvalidValue {
            name: names::PIXEL_SIZE,
            reason: "pixel size and gamma must be positive",
        });
    }
    vp.max_depth = number_field(record, "viewplane", names::MAX_DEPTH)? as u32;
    vp.sampler_id = Some(sampler_index);
    Ok(())
}

fn load_materials(root: &Table, world: &mut World) -> LoadResult<()> {
    for record in records(root, names::MATERIALS)? {
        let tag = string_field(record, "material", names::TYPE)?;
        let material = match tag {
            "matte" => Material::Matte {
                ambient: lambertian(record, world, names::AMBIENT_KD, names::AMBIENT_CD, names::AMBIENT_SAMPLER_INDEX)?,
                diffuse: lambertian(record, world, names::DIFFUSE_KD, names::DIFFUSE_CD, names::DIFFUSE_SAMPLER_INDEX)?,
            },
            "phong" => {
                let sampler_index = index_field(record, "material", names::SPECULAR_SAMPLER_INDEX)?;
                check_index(names::SPECULAR_SAMPLER_INDEX, "samplers", sampler_index, world.samplers().len())?;
                Material::Phong {
                    ambient: lambertian(record, world, names::AMBIENT_KD, names::AMBIENT_CD, names::AMBIENT_SAMPLER_INDEX)?,
                    diffuse: lambertian(record, world, names::DIFFUSE_KD, names::DIFFUSE_CD, names::DIFFUSE_SAMPLER_INDEX)?,
                    specular: Specular {
                        ks: number_field(record, "material", names::SPECULAR_KS)? as f32,
                        cs: color_field(record, "material", names::SPECULAR_CS)?,
                        exp: number_field(record, "material", names::SPECULAR_EXP)? as f32,
                        sampler_id: sampler_index,
                    },
                }
            }
            "emissive" => Material::Emissive {
                radiance_scale: number_field(record, "material", names::RADIANCE_SCALE)? as f32,
                ce: color_field(record, "material", names::EMISSIVE_CE)?,
            },
            other => {
                return Err(LoadError::UnknownTag { section: "material", tag: other.to_string() })
            }
        };
        world.add_material(material);
    }
    Ok(())
}

fn load_geometries(root: &Table, world: &mut World) -> LoadResult<()> {
    for record in records(root, names::GEOMETRIES)? {
        let tag = string_field(record, "geometry", names::TYPE)?;
        let cast_shadows = bool_field(record, "geometry", names::CAST_SHADOWS)?;
        let material_index = index_field(record, "geometry", names::MATERIAL_INDEX)?;
        check_index(names::MATERIAL_INDEX, "materials", material_index, world.materials().len())?;

        let shape = match tag {
            "plane" => Shape::Plane {
                point: vector_field(record, "geometry", names::POINT)?,
                normal: vector_field(record, "geometry", names::NORMAL)?,
            },
            "sphere" => Shape::Sphere {
                center: vector_field(record, "geometry", names::CENTER)?,
                radius: number_field(record, "geometry", names::RADIUS)? as f32,
            },
            // Rectangle::new recomputes the derived dimensions from the
            // serialized sides.
            "rectangle" => Shape::Rectangle(Rectangle::new(
                vector_field(record, "geometry", names::POINT)?,
                vector_field(record, "geometry", names::SIDE_A)?,
                vector_field(record, "geometry", names::SIDE_B)?,
                vector_field(record, "geometry", names::NORMAL)?,
            )),
            other => {
                return Err(LoadError::UnknownTag { section: "geometry", tag: other.to_string() })
            }
        };

        world.add_object(Geometry { shape, cast_shadows, material_id: material_index });
    }
    Ok(())
}

fn load_lights(root: &Table, world: &mut World) -> LoadResult<()> {
    for record in records(root, names::LIGHTS)? {
        let tag = string_field(record, "light", names::TYPE)?;
        let cast_shadows = bool_field(record, "light", names::CAST_SHADOWS)?;

        let light = match tag {
            "directional" => Light::Directional {
                cast_shadows,
                radiance_scale: number_field(record, "light", names::RADIANCE_SCALE)? as f32,
                color: color_field(record, "light", names::COLOR)?,
                direction: vector_field(record, "light", names::DIRECTION)?,
            },
            "point" => Light::Point {
                cast_shadows,
                radiance_scale: number_field(record, "light", names::RADIANCE_SCALE)? as f32,
                color: color_field(record, "light", names::COLOR)?,
                location: vector_field(record, "light", names::LOCATION)?,
            },
            "ambient" => Light::Ambient {
                cast_shadows,
                radiance_scale: number_field(record, "light", names::RADIANCE_SCALE)? as f32,
                color: color_field(record, "light", names::COLOR)?,
            },
            "ambient_occluder" => {
                let sampler_index = index_field(record, "light", names::SAMPLER_INDEX)?;
                check_index(names::SAMPLER_INDEX, "samplers", sampler_index, world.samplers().len())?;
                Light::AmbientOccluder {
                    cast_shadows,
                    radiance_scale: number_field(record, "light", names::RADIANCE_SCALE)? as f32,
                    color: color_field(record, "light", names::COLOR)?,
                    min_amount: color_field(record, "light", names::MIN_AMOUNT)?,
                    sampler_id: sampler_index,
                }
            }
            "area" => {
                let object_index = index_field(record, "light", names::OBJECT_INDEX)?;
                check_index(names::OBJECT_INDEX, "geometries", object_index, world.objects().len())?;
                Light::Area { cast_shadows, object_id: object_index }
            }
            "environment" => {
                let material_index = index_field(record, "light", names::MATERIAL_INDEX)?;
                check_index(names::MATERIAL_INDEX, "materials", material_index, world.materials().len())?;
                // validate() rejects a non-emissive target after loading.
                Light::Environment { cast_shadows, material_id: material_index }
            }
            other => {
                return Err(LoadError::UnknownTag { section: "light", tag: other.to_string() })
            }
        };

        world.add_light(light);
    }
    Ok(())
}

fn records<'a>(root: &'a Table, section: &'static str) -> LoadResult<impl Iterator<Item = &'a Table>> {
    let table = root
        .table(section)
        .ok_or(LoadError::MissingSection { section })?;
    Ok(table.items().iter().filter_map(|item| match item {
        Value::Table(record) => Some(record),
        _ => None,
    }))
}

fn lambertian(
    record: &Table,
    world: &World,
    kd: &'static str,
    cd: &'static str,
    sampler_index: &'static str,
) -> LoadResult<Lambertian> {
    let index = index_field(record, "material", sampler_index)?;
    check_index(sampler_index, "samplers", index, world.samplers().len())?;
    Ok(Lambertian {
        kd: number_field(record, "material", kd)? as f32,
        cd: color_field(record, "material", cd)?,
        sampler_id: index,
    })
}

fn check_index(
    field: &'static str,
    collection: &'static str,
    index: usize,
    len: usize,
) -> LoadResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(LoadError::BrokenReference { field, collection, index, len })
    }
}

fn number_field(table: &Table, context: &'static str, name: &'static str) -> LoadResult<f64> {
    table
        .number(name)
        .ok_or_else(|| LoadError::MissingField { context, name: name.to_string() })
}

fn index_field(table: &Table, context: &'static str, name: &'static str) -> LoadResult<usize> {
    let value = number_field(table, context, name)?;
    if value < 0.0 {
        return Err(LoadError::InvalidValue { name, reason: "index must not be negative" });
    }
    Ok(value as usize)
}

fn bool_field(table: &Table, context: &'static str, name: &'static str) -> LoadResult<bool> {
    table
        .boolean(name)
        .ok_or_else(|| LoadError::MissingField { context, name: name.to_string() })
}

fn string_field<'a>(
    table: &'a Table,
    context: &'static str,
    name: &'static str,
) -> LoadResult<&'a str> {
    table
        .string(name)
        .ok_or_else(|| LoadError::MissingField { context, name: name.to_string() })
}

fn color_field(table: &Table, context: &'static str, name: &'static str) -> LoadResult<RgbColor> {
    let inner = table
        .table(name)
        .ok_or_else(|| LoadError::MissingField { context, name: name.to_string() })?;
    Ok(RgbColor::new(
        number_field(inner, context, "r")? as f32,
        number_field(inner, context, "g")? as f32,
        number_field(inner, context, "b")? as f32,
    ))
}

fn vector_field(table: &Table, context: &'static str, name: &'static str) -> LoadResult<Vec3> {
    let inner = table
        .table(name)
        .ok_or_else(|| LoadError::MissingField { context, name: name.to_string() })?;
    Ok(Vec3::new(
        number_field(inner, context, "x")? as f32,
        number_field(inner, context, "y")? as f32,
        number_field(inner, context, "z")? as f32,
    ))
}
