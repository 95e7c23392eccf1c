use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use pgstore_notp::Packet;
use pgstore_objects::{Commit, Object, ObjectInfo, ObjectInstance, ObjectManager, Tree};
use serde_json::json;
use tracing::info;

use crate::cli::*;
use crate::config::CliConfig;
use crate::transfer::{build_bundle, pack_bundle, unpack_packet};

pub fn run_command(cli: Cli, config: &CliConfig) -> anyhow::Result<()> {
    let manager = ObjectManager::with_algorithm(config.digest);
    match cli.command {
        Command::Hash(args) => cmd_hash(&manager, args),
        Command::Encode(args) => cmd_encode(&manager, args),
        Command::Inspect(args) => cmd_inspect(&manager, args, cli.format),
        Command::Pack(args) => cmd_pack(&manager, args, config),
        Command::Unpack(args) => cmd_unpack(&manager, args, cli.format),
    }
}

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn write(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, data).with_context(|| format!("writing {}", path.display()))
}

fn cmd_hash(manager: &ObjectManager, args: HashArgs) -> anyhow::Result<()> {
    let object = manager.encode_raw(&read(&args.file)?);
    println!("{}  {}", object.id().to_string().yellow(), args.file.display());
    Ok(())
}

fn encode_input(manager: &ObjectManager, kind: EncodeKind, data: &[u8]) -> anyhow::Result<Object> {
    let object = match kind {
        EncodeKind::Blob => manager.create_blob_object(data)?,
        EncodeKind::Commit => {
            let commit: Commit = serde_json::from_slice(data).context("parsing commit JSON")?;
            manager.create_commit_object(&commit)?
        }
        EncodeKind::Tree => {
            let tree: Tree = serde_json::from_slice(data).context("parsing tree JSON")?;
            manager.create_tree_object(&tree)?
        }
    };
    Ok(object)
}

fn cmd_encode(manager: &ObjectManager, args: EncodeArgs) -> anyhow::Result<()> {
    let object = encode_input(manager, args.kind, &read(&args.input)?)?;
    write(&args.output, object.content())?;
    info!(id = %object.id(), output = %args.output.display(), "object written");
    println!(
        "{} {} ({} bytes)",
        "✓".green().bold(),
        object.id().to_string().yellow(),
        object.len()
    );
    Ok(())
}

fn cmd_inspect(
    manager: &ObjectManager,
    args: InspectArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let object = manager.read_object(&read(&args.record)?)?;
    let info = manager.decode(&object)?;
    print_info(&info, format)
}

fn cmd_pack(manager: &ObjectManager, args: PackArgs, config: &CliConfig) -> anyhow::Result<()> {
    let bundle = build_bundle(manager, &args.path, &args.files)?;
    for section in bundle.failed_sections() {
        let reason = section.error().map(|e| e.to_string()).unwrap_or_default();
        println!("  {} {}: {}", "failed:".red(), section.name(), reason);
    }
    let packet = pack_bundle(&bundle, config)?;
    write(&args.output, packet.as_bytes())?;
    println!(
        "{} Packed {}/{} sections of {} into {}",
        "✓".green().bold(),
        bundle.objects().count(),
        bundle.expected_count(),
        bundle.path().bold(),
        args.output.display()
    );
    Ok(())
}

fn cmd_unpack(
    manager: &ObjectManager,
    args: UnpackArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let packet = Packet::new(read(&args.packet)?);
    let infos = unpack_packet(manager, packet)?;
    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        for info in &infos {
            if let Some(data) = info.as_blob() {
                write(&dir.join(info.object().id().to_hex()), data)?;
            }
        }
    }
    for info in &infos {
        print_info(info, format)?;
    }
    Ok(())
}

fn describe(info: &ObjectInfo) -> serde_json::Value {
    let instance = match info.instance() {
        ObjectInstance::Commit(commit) => json!(commit),
        ObjectInstance::Tree(tree) => json!(tree),
        ObjectInstance::Blob(data) => json!({ "size": data.len() }),
    };
    json!({
        "id": info.object().id().to_hex(),
        "type": info.object_type().as_str(),
        "instance": instance,
    })
}

fn print_info(info: &ObjectInfo, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&describe(info))?);
        return Ok(());
    }
    println!(
        "{} {}",
        info.object_type().as_str().cyan().bold(),
        info.object().id().to_string().yellow()
    );
    match info.instance() {
        ObjectInstance::Commit(commit) => {
            println!("  tree      {}", commit.tree);
            println!("  parent    {}", commit.parent);
            println!("  author    {} <{}>", commit.author, commit.author_time.to_rfc3339());
            println!("  committer {} <{}>", commit.committer, commit.committer_time.to_rfc3339());
            println!("\n  {}", commit.message);
        }
        ObjectInstance::Tree(tree) => {
            for entry in &tree.entries {
                println!("  {} {} {}", entry.kind, entry.identity.to_string().dimmed(), entry.name);
            }
        }
        ObjectInstance::Blob(data) => println!("  {} bytes", data.len()),
    }
    Ok(())
}
