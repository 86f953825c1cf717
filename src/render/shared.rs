use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

use crate::palette::PALETTE_SIZE;
use crate::shading::ROW_COUNT;

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Debug)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
}

/// Lighting state consumed by the renderer's uniform buffer.
#[derive(Clone, Debug)]
pub struct LightParams {
    /// Unit vector towards the directional light.
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub sun_intensity: f32,
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub environment: f32,
}

/// Per-mesh state: transform, palette and material.
#[derive(Clone, Debug)]
pub struct SurfaceParams {
    pub model: Mat4,
    pub normal: Mat3,
    /// Linear palette colors.
    pub palette: [Vec3; PALETTE_SIZE],
    pub metalness: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// xyz direction, w intensity.
    pub sun_direction: [f32; 4],
    pub sun_color: [f32; 4],
    /// rgb premultiplied by intensity, w environment strength.
    pub ambient: [f32; 4],
    /// x playhead, y band count.
    pub params: [f32; 4],
}

impl GlobalUniform {
    pub fn new(camera: &CameraParams, light: &LightParams, playhead: f32) -> Self {
        Self {
            view_proj: camera.view_proj.to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).into(),
            sun_direction: light.sun_direction.extend(light.sun_intensity).into(),
            sun_color: light.sun_color.extend(1.0).into(),
            ambient: (light.ambient_color * light.ambient_intensity)
                .extend(light.environment)
                .into(),
            params: [playhead, ROW_COUNT, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ObjectConstants {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub palette: [[f32; 4]; PALETTE_SIZE],
    /// x metalness.
    pub material: [f32; 4],
}

impl ObjectConstants {
    pub fn new(surface: &SurfaceParams) -> Self {
        Self {
            model: surface.model.to_cols_array_2d(),
            normal: mat3_to_3x4(surface.normal),
            palette: surface.palette.map(|color| color.extend(1.0).into()),
            material: [surface.metalness, 0.0, 0.0, 0.0],
        }
    }
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

pub(crate) const SHADER: &str = r#"
const PI: f32 = 3.14159265;

struct GlobalUniform {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    sun_direction: vec4<f32>,
    sun_color: vec4<f32>,
    ambient: vec4<f32>,
    params: vec4<f32>,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    palette: array<vec4<f32>, 5>,
    material: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var<uniform> surface: ObjectConstants;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = surface.model * vec4<f32>(input.position, 1.0);
    out.position = globals.view_proj * world_position;
    out.world_pos = world_position.xyz;

    let normal_matrix = mat3x3<f32>(
        surface.normal[0].xyz,
        surface.normal[1].xyz,
        surface.normal[2].xyz
    );
    out.normal = normal_matrix * input.normal;
    out.uv = input.uv;
    return out;
}

fn row_random(uv_y: f32) -> f32 {
    let row = floor(fract(uv_y + globals.params.x) * globals.params.y);
    return fract(sin(row * 123.0) * 456789.123);
}

fn palette_color(random: f32) -> vec3<f32> {
    var color = surface.palette[0].rgb;
    color = mix(color, surface.palette[1].rgb, step(0.2, random));
    color = mix(color, surface.palette[2].rgb, step(0.4, random));
    color = mix(color, surface.palette[3].rgb, step(0.6, random));
    color = mix(color, surface.palette[4].rgb, step(0.8, random));
    return color;
}

fn distribution_ggx(n_dot_h: f32, alpha: f32) -> f32 {
    let a2 = alpha * alpha;
    let d = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * d * d);
}

fn visibility_smith(n_dot_l: f32, n_dot_v: f32, alpha: f32) -> f32 {
    let a2 = alpha * alpha;
    let gv = n_dot_l * sqrt(a2 + (1.0 - a2) * n_dot_v * n_dot_v);
    let gl = n_dot_v * sqrt(a2 + (1.0 - a2) * n_dot_l * n_dot_l);
    return 0.5 / max(gv + gl, 1e-6);
}

fn fresnel_schlick(f0: vec3<f32>, v_dot_h: f32) -> vec3<f32> {
    return f0 + (vec3<f32>(1.0) - f0) * pow(1.0 - v_dot_h, 5.0);
}

// Analytic fit of the split-sum environment BRDF.
fn env_brdf(f0: vec3<f32>, roughness: f32, n_dot_v: f32) -> vec3<f32> {
    let c0 = vec4<f32>(-1.0, -0.0275, -0.572, 0.022);
    let c1 = vec4<f32>(1.0, 0.0425, 1.04, -0.04);
    let r = roughness * c0 + c1;
    let a004 = min(r.x * r.x, exp2(-9.28 * n_dot_v)) * r.x + r.y;
    let ab = vec2<f32>(-1.04, 1.04) * a004 + r.zw;
    return f0 * ab.x + vec3<f32>(ab.y);
}

// Neutral room: bright ceiling, dim floor.
fn room_radiance(direction: vec3<f32>) -> vec3<f32> {
    let t = direction.y * 0.5 + 0.5;
    return mix(vec3<f32>(0.35), vec3<f32>(0.9), t);
}

@fragment
fn fs_main(input: VertexOutput, @builtin(front_facing) front_facing: bool) -> @location(0) vec4<f32> {
    let base_color = palette_color(row_random(input.uv.y));
    let roughness = clamp(base_color.r, 0.045, 1.0);
    let metalness = surface.material.x;
    let alpha = roughness * roughness;

    var n = normalize(input.normal);
    if (!front_facing) {
        n = -n;
    }
    let v = normalize(globals.camera_position.xyz - input.world_pos);
    let l = normalize(globals.sun_direction.xyz);
    let h = normalize(l + v);
    let n_dot_l = saturate(dot(n, l));
    let n_dot_v = max(dot(n, v), 1e-4);
    let n_dot_h = saturate(dot(n, h));
    let v_dot_h = saturate(dot(v, h));

    let diffuse_color = base_color * (1.0 - metalness);
    let f0 = mix(vec3<f32>(0.04), base_color, metalness);

    let specular = fresnel_schlick(f0, v_dot_h)
        * distribution_ggx(n_dot_h, alpha)
        * visibility_smith(n_dot_l, n_dot_v, alpha);
    let irradiance = globals.sun_color.rgb * globals.sun_direction.w * n_dot_l;
    var color = irradiance * (diffuse_color / PI + specular);

    color += globals.ambient.rgb * diffuse_color / PI;

    let reflected = reflect(-v, n);
    let env_diffuse = room_radiance(n) * diffuse_color;
    let env_specular = mix(room_radiance(reflected), room_radiance(n), roughness)
        * env_brdf(f0, roughness, n_dot_v);
    color += globals.ambient.w * (env_diffuse + env_specular);

    return vec4<f32>(color, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shading::PALETTE_THRESHOLDS;

    #[test]
    fn uniform_sizes_respect_wgsl_layout() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 144);
        assert_eq!(std::mem::size_of::<ObjectConstants>(), 208);
        assert_eq!(std::mem::size_of::<GlobalUniform>() % 16, 0);
    }

    #[test]
    fn global_uniform_packs_light_and_playhead() {
        let camera = CameraParams {
            view_proj: Mat4::IDENTITY,
            position: Vec3::new(0.0, -1.0, 20.0),
        };
        let light = LightParams {
            sun_direction: Vec3::Z,
            sun_color: Vec3::ONE,
            sun_intensity: 0.5,
            ambient_color: Vec3::ONE,
            ambient_intensity: 0.5,
            environment: 0.8,
        };
        let uniform = GlobalUniform::new(&camera, &light, -0.25);
        assert_eq!(uniform.sun_direction, [0.0, 0.0, 1.0, 0.5]);
        assert_eq!(uniform.ambient, [0.5, 0.5, 0.5, 0.8]);
        assert_eq!(uniform.params, [-0.25, 57.0, 0.0, 0.0]);
    }

    #[test]
    fn object_constants_pad_palette_and_normal() {
        let surface = SurfaceParams {
            model: Mat4::IDENTITY,
            normal: Mat3::IDENTITY,
            palette: [Vec3::X; PALETTE_SIZE],
            metalness: 0.2,
        };
        let constants = ObjectConstants::new(&surface);
        assert_eq!(constants.palette[4], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(constants.normal[1], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(constants.material, [0.2, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn shader_parses_and_validates() {
        let module = naga::front::wgsl::parse_str(SHADER).expect("shader parses");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        )
        .validate(&module)
        .expect("shader validates");

        let entry_points: Vec<_> = module.entry_points.iter().map(|ep| ep.name.as_str()).collect();
        assert_eq!(entry_points, ["vs_main", "fs_main"]);
    }

    #[test]
    fn shader_ramp_matches_cpu_constants() {
        for edge in PALETTE_THRESHOLDS {
            let ladder = format!("step({edge:?}, random)");
            assert!(SHADER.contains(&ladder), "missing {ladder}");
        }
        assert!(SHADER.contains("fract(sin(row * 123.0) * 456789.123)"));
        assert!(SHADER.contains("floor(fract(uv_y + globals.params.x) * globals.params.y)"));
        assert!(SHADER.contains(&format!("array<vec4<f32>, {PALETTE_SIZE}>")));
        assert!(SHADER.contains("let roughness = clamp(base_color.r, 0.045, 1.0);"));
    }
}
