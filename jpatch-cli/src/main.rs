use clap::{Parser, Subcommand};
use jpatch_class::{ClassCodec, ClassModel, MethodDescriptor, YamlCodec};
use jpatch_engine::{Manifest, Registry, Transformer};
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[cfg(target_env = "msvc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "jpatch", about = "Apply find/insert/jump hooks to class method bodies")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Patch a YAML class dump with the hooks of one or more manifests
    Apply {
        /// Hook manifest (repeatable)
        #[arg(long = "hooks", required = true)]
        hooks: Vec<PathBuf>,
        /// YAML class dump
        #[arg(short, long)]
        input: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Component name (default: the class name in the dump)
        #[arg(short, long)]
        component: Option<String>,
        /// Exit with status 1 if any hook failed
        #[arg(long)]
        strict: bool,
    },
    /// List the method bodies of a YAML class dump
    Disasm {
        /// YAML class dump
        input: PathBuf,
        /// Only this method
        #[arg(short, long)]
        method: Option<String>,
    },
    /// Validate hook manifests
    Check {
        /// Hook manifests
        #[arg(required = true)]
        manifests: Vec<PathBuf>,
    },
    /// Explain method descriptors
    Descriptor {
        /// Descriptors such as `(ILjava/lang/String;)Z`
        #[arg(required = true)]
        descriptors: Vec<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            hooks,
            input,
            output,
            component,
            strict,
        } => cmd_apply(&hooks, &input, output.as_deref(), component, strict),
        Commands::Disasm { input, method } => cmd_disasm(&input, method.as_deref()),
        Commands::Check { manifests } => cmd_check(&manifests),
        Commands::Descriptor { descriptors } => cmd_descriptor(&descriptors),
    }
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

fn read_input(path: &Path) -> Vec<u8> {
    match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => fail(format_args!("{}: {e}", path.display())),
    }
}

fn decode_class(path: &Path) -> ClassModel {
    match YamlCodec.decode(&read_input(path)) {
        Ok(class) => class,
        Err(e) => fail(format_args!("{}: {e}", path.display())),
    }
}

fn cmd_apply(
    hooks: &[PathBuf],
    input: &Path,
    output: Option<&Path>,
    component: Option<String>,
    strict: bool,
) {
    let registry = match Registry::from_manifests(hooks) {
        Ok(r) => r,
        Err(e) => fail(e),
    };
    let raw = read_input(input);
    let component = match component {
        Some(c) => c,
        None => match YamlCodec.decode(&raw) {
            Ok(class) => class.name,
            Err(e) => fail(format_args!("{}: {e}", input.display())),
        },
    };

    let transformer = Transformer::new(registry, YamlCodec);
    let (bytes, report) = match transformer.transform_with_report(&component, &raw) {
        Ok(r) => r,
        Err(e) => fail(e),
    };
    eprint!("{report}");

    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, &bytes) {
                fail(format_args!("{}: {e}", path.display()));
            }
        }
        None => print!("{}", String::from_utf8_lossy(&bytes)),
    }

    if strict && !report.is_success() {
        std::process::exit(1);
    }
}

fn cmd_disasm(input: &Path, only: Option<&str>) {
    let class = decode_class(input);
    println!("# Class: {}", class.name);
    if let Some(ref s) = class.super_name {
        println!("# Super: {s}");
    }
    println!(
        "# Methods: {}, Fields: {}",
        class.methods.len(),
        class.fields.len()
    );
    println!();

    for field in &class.fields {
        println!(".field {:?} {} {}", field.access, field.name, field.descriptor);
    }
    if !class.fields.is_empty() {
        println!();
    }

    for method in class.methods.iter().filter(|m| only.is_none_or(|n| m.name == n)) {
        println!(".method {}{} {{", method.name, method.descriptor);
        if method.body.is_empty() {
            println!("    # (no code)");
        } else {
            println!(
                "    # max_stack {}, max_locals {}",
                method.max_stack, method.max_locals
            );
            print!("{}", method.body);
        }
        println!("}}");
        println!();
    }
}

fn cmd_check(manifests: &[PathBuf]) {
    let mut failed = false;
    for path in manifests {
        let hooks = match Manifest::load(path).and_then(Manifest::into_hooks) {
            Ok(h) => h,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                failed = true;
                continue;
            }
        };
        println!("{}: {} hooks", path.display(), hooks.len());
        for hook in &hooks {
            println!(
                "  {} -> {} ({} steps{})",
                hook.id(),
                hook.target(),
                hook.steps().len(),
                if hook.debug() { ", debug" } else { "" }
            );
            for step in hook.steps() {
                println!("      {step}");
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}

fn cmd_descriptor(descriptors: &[String]) {
    let mut failed = false;
    for d in descriptors {
        match MethodDescriptor::parse(d) {
            Ok(parsed) => {
                println!("{d}");
                println!("  java:      {}", parsed.java_signature());
                println!("  params:    {}", parsed.params.len());
                println!("  arg slots: {}", parsed.arg_slots());
                println!("  returns:   {}", parsed.ret.java_name());
            }
            Err(e) => {
                eprintln!("{d}: {e}");
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}
