// Compiles the demo GLSL shaders to SPIR-V with glslc (Vulkan SDK).

use std::path::Path;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=shaders/");

    compile_shader("shaders/triangle.vert", "shaders/triangle.vert.spv");
    compile_shader("shaders/triangle.frag", "shaders/triangle.frag.spv");
}

fn compile_shader(input: &str, output: &str) {
    let result = Command::new("glslc")
        .arg(Path::new(input))
        .arg("-o")
        .arg(Path::new(output))
        .status();

    match result {
        Ok(status) if status.success() => {
            println!("compiled {input} -> {output}");
        }
        Ok(status) => {
            panic!("failed to compile {input}: exit code {:?}", status.code());
        }
        Err(e) => {
            // Missing glslc only breaks the demo binary at runtime, not the
            // build; tests and the library itself do not need the shaders.
            eprintln!("warning: glslc not found ({e}); compile manually:");
            eprintln!("  glslc {input} -o {output}");
        }
    }
}
