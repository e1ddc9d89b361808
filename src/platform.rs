//! Host platform and architecture, named the way Node reports them
//! (`process.platform` / `process.arch`).

/// Node-style platform name for the host OS (`linux`, `darwin`, `win32`, ...).
pub fn host_platform() -> &'static str {
    node_platform(std::env::consts::OS)
}

/// Node-style architecture name for the host CPU (`x64`, `arm64`, `ia32`, ...).
pub fn host_arch() -> &'static str {
    node_arch(std::env::consts::ARCH)
}

/// Map a Rust `target_os` value to Node's `process.platform`.
pub fn node_platform(os: &str) -> &'static str {
    match os {
        "linux" => "linux",
        "macos" => "darwin",
        "windows" => "win32",
        "android" => "android",
        "freebsd" => "freebsd",
        "openbsd" => "openbsd",
        "netbsd" => "netbsd",
        "solaris" | "illumos" => "sunos",
        "aix" => "aix",
        _ => "unknown",
    }
}

/// Map a Rust `target_arch` value to Node's `process.arch`.
pub fn node_arch(arch: &str) -> &'static str {
    match arch {
        "x86_64" => "x64",
        "x86" => "ia32",
        "aarch64" => "arm64",
        "arm" => "arm",
        "riscv64" => "riscv64",
        "powerpc64" => "ppc64",
        "s390x" => "s390x",
        "loongarch64" => "loong64",
        "mips" => "mips",
        "mips64" => "mips64el",
        _ => "unknown",
    }
}
