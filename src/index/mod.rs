mod builder;
mod declaration;

pub use builder::{IndexBuilder, MethodRef, ParallelIndexBuilder, ProjectIndex};
pub use declaration::{
    resolve_type_name, short_name, simple_type_name, Annotation, CallSite, ClassDecl, Language, Location,
    MethodDecl, Receiver,
};
