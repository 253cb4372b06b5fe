use std::process::Command;

fn main() {
    let output = Command::new("git")
        .args(&["describe", "--tags", "--always", "--dirty"])
        .output();
    let git_hash = match output {
        Ok(output) => String::from_utf8(output.stdout).unwrap_or_default(),
        Err(_) => String::new(),
    };

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);

    let docker_check = Command::new("docker").arg("--version").output();

    if docker_check.is_err() {
        println!("cargo:warning=docker not found in PATH, transcription workers will not start");
    }
}
