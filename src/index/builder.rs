use super::{Annotation, ClassDecl, MethodDecl};
use crate::discovery::{FileType, SourceFile};
use crate::parser::{JavaParser, KotlinParser, ParsedUnit, Parser as SourceParser};
use miette::{Result, WrapErr};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Address of a method declaration inside the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub unit: usize,
    pub method: usize,
}

/// All parsed units of a project plus the lookup tables used for call resolution
#[derive(Debug, Default)]
pub struct ProjectIndex {
    units: Vec<ParsedUnit>,
    methods_by_name: HashMap<String, Vec<MethodRef>>,
    class_names: HashSet<String>,
    package_annotations: HashMap<String, Vec<Annotation>>,
}

impl ProjectIndex {
    pub fn from_units(units: Vec<ParsedUnit>) -> Self {
        let mut methods_by_name: HashMap<String, Vec<MethodRef>> = HashMap::new();
        let mut package_annotations: HashMap<String, Vec<Annotation>> = HashMap::new();
        let mut class_names = HashSet::new();

        for (unit_index, unit) in units.iter().enumerate() {
            class_names.extend(unit.classes.iter().map(|class| class.name.clone()));

            for (method_index, method) in unit.methods.iter().enumerate() {
                methods_by_name
                    .entry(method.name.clone())
                    .or_default()
                    .push(MethodRef {
                        unit: unit_index,
                        method: method_index,
                    });
            }

            if unit.is_package_info() && !unit.file_annotations.is_empty() {
                package_annotations
                    .entry(unit.package.clone().unwrap_or_default())
                    .or_default()
                    .extend(unit.file_annotations.iter().cloned());
            }
        }

        Self {
            units,
            methods_by_name,
            class_names,
            package_annotations,
        }
    }

    pub fn units(&self) -> &[ParsedUnit] {
        &self.units
    }

    pub fn unit(&self, index: usize) -> &ParsedUnit {
        &self.units[index]
    }

    pub fn method(&self, method: MethodRef) -> &MethodDecl {
        &self.units[method.unit].methods[method.method]
    }

    /// Declaring class of a method followed by its enclosing classes
    pub fn owner_chain(&self, method: MethodRef) -> impl Iterator<Item = &ClassDecl> + '_ {
        let unit = &self.units[method.unit];
        unit.methods[method.method]
            .owner
            .into_iter()
            .flat_map(move |owner| unit.class_chain(owner))
    }

    /// Every declared method with the given simple name
    pub fn methods_named(&self, name: &str) -> &[MethodRef] {
        self.methods_by_name
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether any unit declares a class with this simple name
    pub fn declares_class(&self, name: &str) -> bool {
        self.class_names.contains(name)
    }

    /// Annotations from `package-info.java` of a package
    pub fn package_annotations(&self, package: Option<&str>) -> &[Annotation] {
        self.package_annotations
            .get(package.unwrap_or_default())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn method_count(&self) -> usize {
        self.units.iter().map(|unit| unit.methods.len()).sum()
    }

    pub fn call_count(&self) -> usize {
        self.units.iter().map(|unit| unit.calls.len()).sum()
    }
}

/// Sequential builder for the project index
pub struct IndexBuilder {
    kotlin_parser: KotlinParser,
    java_parser: JavaParser,
    units: Vec<ParsedUnit>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            kotlin_parser: KotlinParser::new(),
            java_parser: JavaParser::new(),
            units: Vec::new(),
        }
    }

    /// Parse a source file and add it to the index
    pub fn process_file(&mut self, file: &SourceFile) -> Result<()> {
        let contents = file.read_contents()?;
        let unit = parse_source(&self.kotlin_parser, &self.java_parser, file, &contents)?;
        self.units.push(unit);
        Ok(())
    }

    /// Add an already parsed unit
    pub fn add_unit(&mut self, unit: ParsedUnit) {
        self.units.push(unit);
    }

    pub fn build(self) -> ProjectIndex {
        ProjectIndex::from_units(self.units)
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parallel index builder; unparsable files are skipped with a warning
pub struct ParallelIndexBuilder;

impl ParallelIndexBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build_from_files(&self, files: &[SourceFile]) -> ProjectIndex {
        info!("Parsing {} files in parallel...", files.len());

        let units: Vec<ParsedUnit> = files
            .par_iter()
            .filter_map(|file| {
                let parsed = file.read_contents().and_then(|contents| {
                    parse_source(&KotlinParser::new(), &JavaParser::new(), file, &contents)
                });
                match parsed {
                    Ok(unit) => Some(unit),
                    Err(e) => {
                        warn!("Skipping {}: {:?}", file.path.display(), e);
                        None
                    }
                }
            })
            .collect();

        let index = ProjectIndex::from_units(units);
        info!(
            "Indexed {} methods and {} call sites",
            index.method_count(),
            index.call_count()
        );
        index
    }
}

impl Default for ParallelIndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_source(
    kotlin: &KotlinParser,
    java: &JavaParser,
    file: &SourceFile,
    contents: &str,
) -> Result<ParsedUnit> {
    debug!("Parsing {:?} file: {}", file.file_type, file.path.display());
    let parsed = match file.file_type {
        FileType::Kotlin => kotlin.parse(&file.path, contents),
        FileType::Java => java.parse(&file.path, contents),
    };
    parsed.wrap_err_with(|| format!("Failed to parse {}", file.path.display()))
}
