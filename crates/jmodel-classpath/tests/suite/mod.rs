mod binary_roots;
mod source_roots;
