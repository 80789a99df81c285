use crate::output::print_json;
use anyhow::Context;
use clap::{Args, Subcommand};
use companion_core::config::Config;
use companion_core::io::{atomic_write, read_text_input};
use companion_core::types::{DiagramType, DocType, PipelinePlatform, ProviderKind};
use companion_llm::FallbackClient;
use companion_server::generator::{
    CodeRequest, DesignRequest, DocumentationRequest, Generated, Generator, PipelineRequest,
    SpecificationRequest, TestRequest,
};
use companion_server::store;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

/// Options shared by every generator.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Preferred provider (anthropic or openai); the other is used as fallback
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// Write the artifact to FILE instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Project id to attach to the stored row
    #[arg(long)]
    project_id: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum GenerateSubcommand {
    /// Software requirements specification
    #[command(alias = "specification")]
    Spec {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Stated requirement (repeatable)
        #[arg(long = "requirement", value_name = "TEXT")]
        requirements: Vec<String>,
        #[arg(long)]
        audience: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Architecture design with Mermaid diagrams
    Design {
        /// Specification text file ('-' for stdin)
        #[arg(long, value_name = "FILE")]
        spec_file: Option<PathBuf>,
        /// Id of a stored specification
        #[arg(long)]
        spec_id: Option<String>,
        /// Diagram type to include (repeatable)
        #[arg(long = "diagram", value_name = "TYPE")]
        diagrams: Vec<DiagramType>,
        #[arg(long)]
        notes: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Source code from a specification, design or requirements
    Code {
        #[arg(long)]
        language: String,
        #[arg(long)]
        framework: Option<String>,
        #[arg(long, value_name = "FILE")]
        spec_file: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        design_file: Option<PathBuf>,
        #[arg(long)]
        spec_id: Option<String>,
        #[arg(long)]
        design_id: Option<String>,
        #[arg(long)]
        requirements: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Test cases for a source file
    Tests {
        /// Source file to test ('-' for stdin)
        file: PathBuf,
        #[arg(long)]
        language: String,
        #[arg(long)]
        framework: Option<String>,
        #[arg(long)]
        requirements: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// CI/CD pipeline definition
    Pipeline {
        /// github-actions, gitlab-ci, jenkins or azure-pipelines
        #[arg(long)]
        platform: PipelinePlatform,
        #[arg(long)]
        language: String,
        #[arg(long)]
        framework: Option<String>,
        #[arg(long)]
        deploy_target: Option<String>,
        /// Pipeline stage (repeatable)
        #[arg(long = "stage", value_name = "NAME")]
        stages: Vec<String>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Project documentation
    #[command(alias = "documentation")]
    Docs {
        /// readme, api, user-guide or architecture
        #[arg(long = "type", value_name = "TYPE")]
        doc_type: DocType,
        #[arg(long)]
        project_name: String,
        /// Source material file ('-' for stdin)
        #[arg(long, value_name = "FILE")]
        source_file: Option<PathBuf>,
        #[arg(long)]
        spec_id: Option<String>,
        #[arg(long)]
        audience: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(config_path: Option<&Path>, subcmd: GenerateSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("failed to load config")?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let llm = FallbackClient::from_config(&config.llm)?;
        let store = store::connect(&config.database).await?;
        let generator = Generator::new(llm, store, Arc::new(config));

        let (generated, common) = dispatch(&generator, subcmd).await?;
        emit(&generated, &common, json)
    })
}

async fn dispatch(
    generator: &Generator,
    subcmd: GenerateSubcommand,
) -> anyhow::Result<(Generated, CommonArgs)> {
    let provider = |c: &CommonArgs| c.provider.map(|p| p.as_str().to_string());

    match subcmd {
        GenerateSubcommand::Spec {
            title,
            description,
            requirements,
            audience,
            common,
        } => {
            let req = SpecificationRequest {
                title,
                description,
                requirements,
                audience,
                project_id: common.project_id.clone(),
                provider: provider(&common),
            };
            Ok((generator.specification(req).await?, common))
        }
        GenerateSubcommand::Design {
            spec_file,
            spec_id,
            diagrams,
            notes,
            common,
        } => {
            let req = DesignRequest {
                specification_id: spec_id,
                specification: read_optional(spec_file.as_deref())?,
                diagram_types: diagrams,
                notes,
                project_id: common.project_id.clone(),
                provider: provider(&common),
            };
            Ok((generator.design(req).await?, common))
        }
        GenerateSubcommand::Code {
            language,
            framework,
            spec_file,
            design_file,
            spec_id,
            design_id,
            requirements,
            common,
        } => {
            let req = CodeRequest {
                specification_id: spec_id,
                design_id,
                specification: read_optional(spec_file.as_deref())?,
                design: read_optional(design_file.as_deref())?,
                language,
                framework,
                requirements,
                project_id: common.project_id.clone(),
                provider: provider(&common),
            };
            Ok((generator.code(req).await?, common))
        }
        GenerateSubcommand::Tests {
            file,
            language,
            framework,
            requirements,
            common,
        } => {
            let code = read_text_input(Some(file.as_path()))
                .with_context(|| format!("failed to read {}", file.display()))?;
            let req = TestRequest {
                code,
                file_name: file.display().to_string(),
                language,
                framework,
                requirements,
                project_id: common.project_id.clone(),
                provider: provider(&common),
            };
            Ok((generator.test_cases(req).await?, common))
        }
        GenerateSubcommand::Pipeline {
            platform,
            language,
            framework,
            deploy_target,
            stages,
            common,
        } => {
            let req = PipelineRequest {
                platform: platform.as_str().to_string(),
                language,
                framework,
                deploy_target,
                stages,
                project_id: common.project_id.clone(),
                provider: provider(&common),
            };
            Ok((generator.pipeline(req).await?, common))
        }
        GenerateSubcommand::Docs {
            doc_type,
            project_name,
            source_file,
            spec_id,
            audience,
            common,
        } => {
            let req = DocumentationRequest {
                doc_type: doc_type.as_str().to_string(),
                project_name,
                source: read_optional(source_file.as_deref())?,
                specification_id: spec_id,
                audience,
                project_id: common.project_id.clone(),
                provider: provider(&common),
            };
            Ok((generator.documentation(req).await?, common))
        }
    }
}

fn read_optional(path: Option<&Path>) -> anyhow::Result<Option<String>> {
    match path {
        Some(p) => {
            let text = read_text_input(Some(p))
                .with_context(|| format!("failed to read {}", p.display()))?;
            Ok(Some(text))
        }
        None => Ok(None),
    }
}

fn emit(generated: &Generated, common: &CommonArgs, json: bool) -> anyhow::Result<()> {
    if let Some(out) = &common.out {
        let mut data = generated.content.clone();
        if !data.ends_with('\n') {
            data.push('\n');
        }
        atomic_write(out, data.as_bytes())
            .with_context(|| format!("failed to write {}", out.display()))?;
        eprintln!(
            "wrote {} ({} via {})",
            out.display(),
            generated.model,
            generated.provider
        );
    }

    if json {
        print_json(generated)?;
    } else if common.out.is_none() {
        println!("{}", generated.content);
    }
    Ok(())
}
