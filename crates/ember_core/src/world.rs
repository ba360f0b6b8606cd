//! The complete scene graph.
//!
//! `World` owns everything a render consumes: the sampler, material,
//! geometry, and light collections, plus the view plane and background
//! color. Cross references between entities are indices into the owning
//! collections, so an entity can never outlive what it points at while the
//! `World` is alive, and serialization can write the indices verbatim.

use thiserror::Error;

use crate::color::RgbColor;
use crate::geometry::Geometry;
use crate::light::Light;
use crate::material::Material;
use crate::sampler::Sampler;
use crate::view_plane::ViewPlane;

/// A referential-integrity or configuration problem that makes a scene
/// unrenderable.
#[derive(Error, Debug)]
pub enum WorldError {
    #[error("view plane has no sampler")]
    MissingViewPlaneSampler,

    #[error("view plane dimensions must be positive (got {width}x{height})")]
    InvalidViewPlane { width: u32, height: u32 },

    #[error("view plane pixel size and gamma must be positive")]
    InvalidViewPlaneScale,

    #[error("{owner} references {collection}[{index}] but there are only {len} entries")]
    BrokenReference {
        owner: &'static str,
        collection: &'static str,
        index: usize,
        len: usize,
    },

    #[error("environment light references non-emissive material {index}")]
    NotEmissive { index: usize },
}

#[derive(Clone, Debug, Default)]
pub struct World {
    samplers: Vec<Sampler>,
    materials: Vec<Material>,
    objects: Vec<Geometry>,
    lights: Vec<Light>,

    pub view_plane: ViewPlane,
    pub background: RgbColor,
    /// Directly-owned ambient light, separate from `lights` and not part
    /// of the serialized representation.
    pub ambient: Option<Light>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty the four entity collections.
    ///
    /// Must be called before repopulating the world from index-based data;
    /// stale entries would silently offset every serialized cross reference.
    pub fn clear(&mut self) {
        self.samplers.clear();
        self.materials.clear();
        self.objects.clear();
        self.lights.clear();
    }

    pub fn add_sampler(&mut self, sampler: Sampler) -> usize {
        self.samplers.push(sampler);
        self.samplers.len() - 1
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_object(&mut self, object: Geometry) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn add_light(&mut self, light: Light) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    pub fn samplers(&self) -> &[Sampler] {
        &self.samplers
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn objects(&self) -> &[Geometry] {
        &self.objects
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn sampler(&self, id: usize) -> Option<&Sampler> {
        self.samplers.get(id)
    }

    pub fn material(&self, id: usize) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn object(&self, id: usize) -> Option<&Geometry> {
        self.objects.get(id)
    }

    /// The sampler driving the view plane, if one is set and resolves.
    pub fn view_plane_sampler(&self) -> Option<&Sampler> {
        self.view_plane.sampler_id.and_then(|id| self.samplers.get(id))
    }

    /// Check every invariant a render depends on.
    ///
    /// A failure here is a malformed scene: the caller must fix the scene,
    /// not retry.
    pub fn validate(&self) -> Result<(), WorldError> {
        let vp = &self.view_plane;
        if vp.width == 0 || vp.height == 0 {
            return Err(WorldError::InvalidViewPlane { width: vp.width, height: vp.height });
        }
        if vp.pixel_size <= 0.0 || vp.gamma <= 0.0 {
            return Err(WorldError::InvalidViewPlaneScale);
        }
        match vp.sampler_id {
            None => return Err(WorldError::MissingViewPlaneSampler),
            Some(id) => self.check_index("view plane", "samplers", id, self.samplers.len())?,
        }

        for material in &self.materials {
            for id in material.sampler_ids() {
                self.check_index("material", "samplers", id, self.samplers.len())?;
            }
        }

        for object in &self.objects {
            self.check_index("geometry", "materials", object.material_id, self.materials.len())?;
        }

        for light in self.lights.iter().chain(self.ambient.iter()) {
            match *light {
                Light::AmbientOccluder { sampler_id, .. } => {
                    self.check_index("light", "samplers", sampler_id, self.samplers.len())?;
                }
                Light::Area { object_id, .. } => {
                    self.check_index("light", "objects", object_id, self.objects.len())?;
                }
                Light::Environment { material_id, .. } => {
                    self.check_index("light", "materials", material_id, self.materials.len())?;
                    if !self.materials[material_id].is_emissive() {
                        return Err(WorldError::NotEmissive { index: material_id });
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn check_index(
        &self,
        owner: &'static str,
        collection: &'static str,
        index: usize,
        len: usize,
    ) -> Result<(), WorldError> {
        if index < len {
            Ok(())
        } else {
            Err(WorldError::BrokenReference { owner, collection, index, len })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use crate::sampler::SamplerKind;
    use glam::Vec3;

    fn minimal_world() -> World {
        let mut world = World::new();
        let sampler = world.add_sampler(Sampler::new(SamplerKind::Regular, 4));
        world.view_plane.sampler_id = Some(sampler);
        world
    }

    #[test]
    fn test_validate_minimal() {
        assert!(minimal_world().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_sampler() {
        let mut world = minimal_world();
        world.view_plane.sampler_id = None;
        assert!(matches!(world.validate(), Err(WorldError::MissingViewPlaneSampler)));
    }

    #[test]
    fn test_validate_broken_material_reference() {
        let mut world = minimal_world();
        world.add_object(Geometry::new(
            crate::geometry::Shape::Sphere { center: Vec3::ZERO, radius: 1.0 },
            7,
        ));
        assert!(matches!(
            world.validate(),
            Err(WorldError::BrokenReference { collection: "materials", index: 7, .. })
        ));
    }

    #[test]
    fn test_validate_environment_needs_emissive() {
        let mut world = minimal_world();
        let channel = Lambertian { kd: 0.5, cd: RgbColor::WHITE, sampler_id: 0 };
        let matte = world.add_material(Material::Matte { ambient: channel, diffuse: channel });
        world.add_light(Light::Environment { cast_shadows: false, material_id: matte });
        assert!(matches!(world.validate(), Err(WorldError::NotEmissive { index: 0 })));
    }

    #[test]
    fn test_clear_empties_collections() {
        let mut world = minimal_world();
        world.add_material(Material::Emissive { radiance_scale: 1.0, ce: RgbColor::WHITE });
        world.clear();
        assert!(world.samplers().is_empty());
        assert!(world.materials().is_empty());
        assert!(world.objects().is_empty());
        assert!(world.lights().is_empty());
    }
}
