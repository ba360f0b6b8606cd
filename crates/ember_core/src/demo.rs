//! Programmatic demo scene.

use glam::Vec3;

use crate::color::RgbColor;
use crate::geometry::{Geometry, Rectangle, Shape};
use crate::light::Light;
use crate::material::{Lambertian, Material};
use crate::sampler::{Sampler, SamplerKind};
use crate::world::World;

fn matte(cd: RgbColor, sampler_id: usize) -> Material {
    let channel = Lambertian { kd: 0.25, cd, sampler_id };
    let diffuse = Lambertian { kd: 0.75, cd, sampler_id };
    Material::Matte { ambient: channel, diffuse }
}

fn wall(point: Vec3, side_a: Vec3, side_b: Vec3, normal: Vec3, material_id: usize) -> Geometry {
    Geometry::new(Shape::Rectangle(Rectangle::new(point, side_a, side_b, normal)), material_id)
}

/// The classic Cornell box, with an area light on the ceiling rectangle and
/// an emissive environment. Used as the default scene by the CLI and as a
/// fully-populated fixture by the persistence tests.
pub fn cornell_box() -> World {
    let mut world = World::new();
    world.background = RgbColor::BLACK;

    let vp_sampler = world.add_sampler(Sampler::new(SamplerKind::MultiJittered, 64));
    let hammersley = world.add_sampler(Sampler::new(SamplerKind::Hammersley, 64));

    world.view_plane.set_dimensions(512, 512);
    world.view_plane.pixel_size = 1.0;
    world.view_plane.gamma = 2.2;
    world.view_plane.max_depth = 5;
    world.view_plane.sampler_id = Some(vp_sampler);

    let white = world.add_material(matte(RgbColor::new(0.7, 0.7, 0.7), hammersley));
    let red = world.add_material(matte(RgbColor::new(0.7, 0.0, 0.0), hammersley));
    let green = world.add_material(matte(RgbColor::new(0.0, 0.7, 0.0), hammersley));
    let emissive = world.add_material(Material::Emissive {
        radiance_scale: 100.0,
        ce: RgbColor::WHITE,
    });

    // Ceiling light panel.
    let mut light_rect = wall(
        Vec3::new(213.0, 548.79, 227.0),
        Vec3::new(343.0 - 213.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 332.0 - 227.0),
        Vec3::new(0.0, -1.0, 0.0),
        emissive,
    );
    light_rect.cast_shadows = false;
    let light_rect = world.add_object(light_rect);

    // Walls.
    world.add_object(wall(
        Vec3::ZERO,
        Vec3::new(552.8, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 559.2),
        Vec3::Y,
        white,
    ));
    world.add_object(wall(
        Vec3::new(0.0, 548.8, 0.0),
        Vec3::new(556.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 559.2),
        Vec3::NEG_Y,
        white,
    ));
    world.add_object(wall(
        Vec3::new(552.8, 0.0, 0.0),
        Vec3::new(0.0, 548.8, 0.0),
        Vec3::new(0.0, 0.0, 559.2),
        Vec3::NEG_X,
        red,
    ));
    world.add_object(wall(
        Vec3::ZERO,
        Vec3::new(0.0, 548.8, 0.0),
        Vec3::new(0.0, 0.0, 559.2),
        Vec3::X,
        green,
    ));
    world.add_object(wall(
        Vec3::new(0.0, 0.0, 559.2),
        Vec3::new(0.0, 548.8, 0.0),
        Vec3::new(556.0, 0.0, 0.0),
        Vec3::NEG_Z,
        white,
    ));

    // A sphere standing in for the box interiors.
    world.add_object(Geometry::new(
        Shape::Sphere { center: Vec3::new(185.0, 90.0, 170.0), radius: 90.0 },
        white,
    ));

    world.add_light(Light::Area { cast_shadows: true, object_id: light_rect });
    world.add_light(Light::Environment { cast_shadows: true, material_id: emissive });

    world.ambient = Some(Light::Ambient {
        cast_shadows: false,
        radiance_scale: 0.1,
        color: RgbColor::WHITE,
    });

    world
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cornell_box_is_valid() {
        let world = cornell_box();
        world.validate().expect("demo scene must validate");
        assert_eq!(world.samplers().len(), 2);
        assert_eq!(world.materials().len(), 4);
        assert_eq!(world.objects().len(), 7);
        assert_eq!(world.lights().len(), 2);
    }
}
