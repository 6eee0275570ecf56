mod poem;
