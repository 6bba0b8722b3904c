/// One module for both passes. Lines use `vs_grid`/`fs_grid`, instanced
/// meshes use `vs_mesh`/`fs_mesh`. World space is Z-up.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
    light_dir: vec4<f32>,
    ambient: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct LineIn {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_grid(v: LineIn) -> LineOut {
    var out: LineOut;
    out.clip = uniforms.view_proj * vec4<f32>(v.position, 1.0);
    out.color = v.color;
    return out;
}

@fragment
fn fs_grid(in: LineOut) -> @location(0) vec4<f32> {
    return in.color;
}

struct MeshIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct Instance {
    @location(2) m0: vec4<f32>,
    @location(3) m1: vec4<f32>,
    @location(4) m2: vec4<f32>,
    @location(5) m3: vec4<f32>,
    @location(6) tint: vec4<f32>,
    // x = intensity, y = exponent
    @location(7) specular: vec4<f32>,
};

struct MeshOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tint: vec4<f32>,
    @location(3) specular: vec2<f32>,
};

@vertex
fn vs_mesh(v: MeshIn, inst: Instance) -> MeshOut {
    let model = mat4x4<f32>(inst.m0, inst.m1, inst.m2, inst.m3);
    let world = model * vec4<f32>(v.position, 1.0);

    var out: MeshOut;
    out.clip = uniforms.view_proj * world;
    out.world_position = world.xyz;
    out.normal = (model * vec4<f32>(v.normal, 0.0)).xyz;
    out.tint = inst.tint;
    out.specular = inst.specular.xy;
    return out;
}

@fragment
fn fs_mesh(in: MeshOut) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let l = normalize(uniforms.light_dir.xyz);
    let diffuse = max(dot(n, l), 0.0);

    var highlight = 0.0;
    if (in.specular.x > 0.0 && diffuse > 0.0) {
        let view_dir = normalize(uniforms.eye.xyz - in.world_position);
        let half_dir = normalize(l + view_dir);
        highlight = in.specular.x * pow(max(dot(n, half_dir), 0.0), max(in.specular.y, 1.0));
    }

    let lit = in.tint.rgb * (uniforms.ambient.rgb + vec3<f32>(diffuse * 0.7)) + vec3<f32>(highlight);
    return vec4<f32>(lit, in.tint.a);
}
"#;
