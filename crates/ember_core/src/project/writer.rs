//! Project file writer.
//!
//! Sections are emitted in the fixed order samplers, viewplane, materials,
//! geometries, lights. Within a section, records are written in container
//! order, so a record's position equals the index other sections use to
//! reference it; that positional agreement is what makes the index fields
//! stable across a save/load round trip. Floats are written at six decimal
//! places; a round trip is value-stable to that precision, not bit-exact.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use glam::Vec3;

use super::names;
use super::FORMAT_VERSION;
use crate::color::RgbColor;
use crate::geometry::Shape;
use crate::light::Light;
use crate::material::Material;
use crate::world::World;

/// Serialize a world and write it to `path`.
pub fn save(path: impl AsRef<Path>, world: &World) -> io::Result<()> {
    fs::write(path, save_to_string(world))
}

/// Serialize a world to project-file text.
pub fn save_to_string(world: &World) -> String {
    let mut out = String::with_capacity(4 * 1024);
    let mut depth = 0;

    line(&mut out, depth, &format!("{} = {}", names::VERSION, FORMAT_VERSION));

    line(&mut out, depth, &format!("{} =", names::WORLD));
    line(&mut out, depth, "{");
    depth += 1;

    line(
        &mut out,
        depth,
        &format!("{} = {},", names::BACKGROUND_COLOR, color(world.background)),
    );
    out.push('\n');

    write_samplers(&mut out, depth, world);
    write_viewplane(&mut out, depth, world);
    write_materials(&mut out, depth, world);
    write_geometries(&mut out, depth, world);
    write_lights(&mut out, depth, world);

    depth -= 1;
    line(&mut out, depth, "}");
    out
}

fn write_samplers(out: &mut String, depth: usize, world: &World) {
    section(out, depth, names::SAMPLERS, world.samplers().len(), false, |out, depth, i| {
        let sampler = &world.samplers()[i];
        line(out, depth, &format!("{} = \"{}\",", names::TYPE, sampler.kind().as_str()));
        line(out, depth, &format!("{} = {}", names::NUM_SAMPLES, sampler.num_samples()));
    });
}

fn write_viewplane(out: &mut String, depth: usize, world: &World) {
    let vp = &world.view_plane;
    // The writer is also used on unvalidated worlds; a missing sampler is
    // written as index 0 and caught by validation on the load side.
    let sampler_index = vp.sampler_id.unwrap_or(0);

    line(out, depth, &format!("{} =", names::VIEWPLANE));
    line(out, depth, "{");
    line(out, depth + 1, &format!("{} = {},", names::WIDTH, vp.width));
    line(out, depth + 1, &format!("{} = {},", names::HEIGHT, vp.height));
    line(out, depth + 1, &format!("{} = {:.6},", names::PIXEL_SIZE, vp.pixel_size));
    line(out, depth + 1, &format!("{} = {:.6},", names::GAMMA, vp.gamma));
    line(out, depth + 1, &format!("{} = {},", names::MAX_DEPTH, vp.max_depth));
    line(out, depth + 1, &format!("{} = {}", names::SAMPLER_INDEX, sampler_index));
    line(out, depth, "},");
    out.push('\n');
}

fn write_materials(out: &mut String, depth: usize, world: &World) {
    section(out, depth, names::MATERIALS, world.materials().len(), false, |out, depth, i| {
        let material = &world.materials()[i];
        line(out, depth, &format!("{} = \"{}\",", names::TYPE, material.kind_str()));
        match material {
            Material::Matte { ambient, diffuse } => {
                line(out, depth, &format!("{} = {:.6},", names::AMBIENT_KD, ambient.kd));
                line(out, depth, &format!("{} = {},", names::AMBIENT_CD, color(ambient.cd)));
                line(out, depth, &format!("{} = {},", names::AMBIENT_SAMPLER_INDEX, ambient.sampler_id));
                line(out, depth, &format!("{} = {:.6},", names::DIFFUSE_KD, diffuse.kd));
                line(out, depth, &format!("{} = {},", names::DIFFUSE_CD, color(diffuse.cd)));
                line(out, depth, &format!("{} = {}", names::DIFFUSE_SAMPLER_INDEX, diffuse.sampler_id));
            }
            Material::Phong { ambient, diffuse, specular } => {
                line(out, depth, &format!("{} = {:.6},", names::AMBIENT_KD, ambient.kd));
                line(out, depth, &format!("{} = {},", names::AMBIENT_CD, color(ambient.cd)));
                line(out, depth, &format!("{} = {},", names::AMBIENT_SAMPLER_INDEX, ambient.sampler_id));
                line(out, depth, &format!("{} = {:.6},", names::DIFFUSE_KD, diffuse.kd));
                line(out, depth, &format!("{} = {},", names::DIFFUSE_CD, color(diffuse.cd)));
                line(out, depth, &format!("{} = {},", names::DIFFUSE_SAMPLER_INDEX, diffuse.sampler_id));
                line(out, depth, &format!("{} = {:.6},", names::SPECULAR_KS, specular.ks));
                line(out, depth, &format!("{} = {},", names::SPECULAR_CS, color(specular.cs)));
                line(out, depth, &format!("{} = {:.6},", names::SPECULAR_EXP, specular.exp));
                line(out, depth, &format!("{} = {}", names::SPECULAR_SAMPLER_INDEX, specular.sampler_id));
            }
            Material::Emissive { radiance_scale, ce } => {
                line(out, depth, &format!("{} = {:.6},", names::RADIANCE_SCALE, radiance_scale));
                line(out, depth, &format!("{} = {}", names::EMISSIVE_CE, color(*ce)));
            }
        }
    });
}

fn write_geometries(out: &mut String, depth: usize, world: &World) {
    section(out, depth, names::GEOMETRIES, world.objects().len(), false, |out, depth, i| {
        let object = &world.objects()[i];
        line(out, depth, &format!("{} = \"{}\",", names::TYPE, object.shape.kind_str()));
        line(out, depth, &format!("{} = {},", names::CAST_SHADOWS, object.cast_shadows));
        line(out, depth, &format!("{} = {},", names::MATERIAL_INDEX, object.material_id));
        match &object.shape {
            Shape::Plane { point, normal } => {
                line(out, depth, &format!("{} = {},", names::POINT, vector(*point)));
                line(out, depth, &format!("{} = {}", names::NORMAL, vector(*normal)));
            }
            Shape::Sphere { center, radius } => {
                line(out, depth, &format!("{} = {},", names::CENTER, vector(*center)));
                line(out, depth, &format!("{} = {:.6}", names::RADIUS, radius));
            }
            Shape::Rectangle(rect) => {
                line(out, depth, &format!("{} = {},", names::POINT, vector(rect.point)));
                line(out, depth, &format!("{} = {},", names::SIDE_A, vector(rect.side_a)));
                line(out, depth, &format!("{} = {},", names::SIDE_B, vector(rect.side_b)));
                line(out, depth, &format!("{} = {}", names::NORMAL, vector(rect.normal)));
            }
        }
    });
}

fn write_lights(out: &mut String, depth: usize, world: &World) {
    section(out, depth, names::LIGHTS, world.lights().len(), true, |out, depth, i| {
        let light = &world.lights()[i];
        line(out, depth, &format!("{} = \"{}\",", names::TYPE, light.kind_str()));
        match *light {
            Light::Directional { cast_shadows, radiance_scale, color: c, direction } => {
                line(out, depth, &format!("{} = {},", names::CAST_SHADOWS, cast_shadows));
                line(out, depth, &format!("{} = {:.6},", names::RADIANCE_SCALE, radiance_scale));
                line(out, depth, &format!("{} = {},", names::COLOR, color(c)));
                line(out, depth, &format!("{} = {}", names::DIRECTION, vector(direction)));
            }
            Light::Point { cast_shadows, radiance_scale, color: c, location } => {
                line(out, depth, &format!("{} = {},", names::CAST_SHADOWS, cast_shadows));
                line(out, depth, &format!("{} = {:.6},", names::RADIANCE_SCALE, radiance_scale));
                line(out, depth, &format!("{} = {},", names::COLOR, color(c)));
                line(out, depth, &format!("{} = {}", names::LOCATION, vector(location)));
            }
            Light::Ambient { cast_shadows, radiance_scale, color: c } => {
                line(out, depth, &format!("{} = {},", names::CAST_SHADOWS, cast_shadows));
                line(out, depth, &format!("{} = {:.6},", names::RADIANCE_SCALE, radiance_scale));
                line(out, depth, &format!("{} = {}", names::COLOR, color(c)));
            }
            Light::AmbientOccluder {
                cast_shadows,
                radiance_scale,
                color: c,
                min_amount,
                sampler_id,
            } => {
                line(out, depth, &format!("{} = {},", names::CAST_SHADOWS, cast_shadows));
                line(out, depth, &format!("{} = {:.6},", names::RADIANCE_SCALE, radiance_scale));
                line(out, depth, &format!("{} = {},", names::COLOR, color(c)));
                line(out, depth, &format!("{} = {},", names::MIN_AMOUNT, color(min_amount)));
                line(out, depth, &format!("{} = {}", names::SAMPLER_INDEX, sampler_id));
            }
            Light::Area { cast_shadows, object_id } => {
                line(out, depth, &format!("{} = {},", names::CAST_SHADOWS, cast_shadows));
                line(out, depth, &format!("{} = {}", names::OBJECT_INDEX, object_id));
            }
            Light::Environment { cast_shadows, material_id } => {
                line(out, depth, &format!("{} = {},", names::CAST_SHADOWS, cast_shadows));
                line(out, depth, &format!("{} = {}", names::MATERIAL_INDEX, material_id));
            }
        }
    });
}

/// Emit one `name = { record, record, ... }` section.
fn section(
    out: &mut String,
    depth: usize,
    name: &str,
    count: usize,
    last_section: bool,
    mut record: impl FnMut(&mut String, usize, usize),
) {
    line(out, depth, &format!("{name} ="));
    line(out, depth, "{");
    for i in 0..count {
        line(out, depth + 1, "{");
        record(out, depth + 2, i);
        let close = if i + 1 == count { "}" } else { "}," };
        line(out, depth + 1, close);
    }
    line(out, depth, if last_section { "}" } else { "}," });
    out.push('\n');
}

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push('\t');
    }
    let _ = writeln!(out, "{text}");
}

fn color(c: RgbColor) -> String {
    format!("{{r = {:.6}, g = {:.6}, b = {:.6}}}", c.r, c.g, c.b)
}

fn vector(v: Vec3) -> String {
    format!("{{x = {:.6}, y = {:.6}, z = {:.6}}}", v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{Sampler, SamplerKind};

    #[test]
    fn test_sections_in_fixed_order() {
        let mut world = World::new();
        let sampler = world.add_sampler(Sampler::new(SamplerKind::Regular, 4));
        world.view_plane.sampler_id = Some(sampler);

        let text = save_to_string(&world);
        let samplers = text.find("samplers =").unwrap();
        let viewplane = text.find("viewplane =").unwrap();
        let materials = text.find("materials =").unwrap();
        let geometries = text.find("geometries =").unwrap();
        let lights = text.find("lights =").unwrap();

        assert!(samplers < viewplane);
        assert!(viewplane < materials);
        assert!(materials < geometries);
        assert!(geometries < lights);
        assert!(text.starts_with("project_version = 1"));
    }

    #[test]
    fn test_float_precision() {
        let mut world = World::new();
        let sampler = world.add_sampler(Sampler::new(SamplerKind::Regular, 4));
        world.view_plane.sampler_id = Some(sampler);
        world.background = RgbColor::new(0.123456789, 0.0, 1.0);

        let text = save_to_string(&world);
        assert!(text.contains("r = 0.123457"), "six decimal places expected:\n{text}");
    }
}
