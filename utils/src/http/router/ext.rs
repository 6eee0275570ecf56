use super::RouteParams;

pub trait RequestExt {
	/// A path parameter of the matched route.
	fn param(&self, key: &str) -> Option<&str>;

	fn provide<T: Clone + Send + Sync + 'static>(&mut self, data: T);

	fn data<T: Clone + Send + Sync + 'static>(&self) -> Option<&T>;
}

impl<I> RequestExt for hyper::Request<I> {
	fn param(&self, key: &str) -> Option<&str> {
		self.extensions().get::<RouteParams>()?.get(key)
	}

	fn provide<T: Clone + Send + Sync + 'static>(&mut self, data: T) {
		self.extensions_mut().insert(data);
	}

	fn data<T: Clone + Send + Sync + 'static>(&self) -> Option<&T> {
		self.extensions().get::<T>()
	}
}
